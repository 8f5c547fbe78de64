#[macro_use]
extern crate log;
extern crate chrono;
extern crate env_logger;

use chrono::prelude::{DateTime, Local};
use std::io::Write;

fn init_logger() {
    env_logger::builder()
        .format(|buf, record| {
            let now: DateTime<Local> = Local::now();
            let now_str = now.format("%H:%M:%S.%3f").to_string();
            writeln!(buf, "{:5}: {} - {}", record.level(), now_str, record.args())
        })
        .init();
}

fn main() {
    init_logger();

    //sizes the rayon pool, goes first
    cases::cases::silent_peers::run();
    cases::cases::single_voter::run();
    cases::cases::majority_granted::run();
    cases::cases::majority_denied::run();
    cases::cases::higher_term::run();
    cases::cases::unreachable_peers::run();
    cases::cases::pre_election::run();
    cases::cases::misbehaving_peers::run();

    info!("All election cases passed");
}

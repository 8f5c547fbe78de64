use derive_more::Display;

pub mod election;
pub mod vote_counter;

/// Ballot of a single voter.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash)]
pub enum ElectionVote {
    #[display(fmt = "granted")]
    Granted,
    #[display(fmt = "denied")]
    Denied,
}

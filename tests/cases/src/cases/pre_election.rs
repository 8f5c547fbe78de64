use crate::steps;
use raft_election::{ElectionVote, RaftConfig};
use raft_modules::{InProcCluster, MemoryVoter};

pub fn run() {
    pre_vote_then_vote();
    pre_vote_with_live_leader();
}

fn pre_vote_then_vote() {
    let cluster = InProcCluster::start(vec![
        MemoryVoter::new(2, 3).with_log(3, 4),
        MemoryVoter::new(3, 3).with_log(3, 4),
    ]);
    let config = RaftConfig::with_voters(vec![1, 2, 3]);

    let result = steps::run_election(
        config.clone(),
        cluster.proxy_factory(),
        steps::pre_vote_request(1, 4, (3, 4)),
    );

    assert_eq!(ElectionVote::Granted, result.decision);
    assert!(result.vote_request.is_pre_election);
    assert_eq!(3, result.highest_voter_term);

    //pre-election leaves the voters untouched
    for id in vec![2, 3] {
        let voter = cluster.voter(id).expect("voter exists");
        assert_eq!(3, voter.current_term);
        assert_eq!(None, voter.voted_for);
    }

    let result = steps::run_election(
        config,
        cluster.proxy_factory(),
        steps::vote_request(1, 4, (3, 4)),
    );

    assert_eq!(ElectionVote::Granted, result.decision);
    assert_eq!(4, result.highest_voter_term);

    cluster.terminate();
}

fn pre_vote_with_live_leader() {
    let cluster = InProcCluster::start(vec![
        MemoryVoter::new(2, 3).with_live_leader(),
        MemoryVoter::new(3, 3).with_live_leader(),
    ]);
    let config = RaftConfig::with_voters(vec![1, 2, 3]);

    let result = steps::run_election(
        config.clone(),
        cluster.proxy_factory(),
        steps::pre_vote_request(1, 4, (0, 0)),
    );

    assert_eq!(ElectionVote::Denied, result.decision);
    assert_eq!("could not achieve majority", result.message);

    let mut request = steps::pre_vote_request(1, 4, (0, 0));
    request.ignore_live_leader = true;
    let result = steps::run_election(config, cluster.proxy_factory(), request);

    assert_eq!(ElectionVote::Granted, result.decision);

    cluster.terminate();
}

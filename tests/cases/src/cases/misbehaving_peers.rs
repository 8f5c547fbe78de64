use crate::steps;
use raft_election::{ElectionVote, RaftConfig};
use raft_modules::{InProcCluster, MemoryVoter, VoterBehaviour};

pub fn run() {
    let cluster = InProcCluster::start(vec![
        MemoryVoter::new(2, 1).with_behaviour(VoterBehaviour::WrongIdentity(7)),
        MemoryVoter::new(3, 1).with_behaviour(VoterBehaviour::GroupError(
            "Group is not hosted".to_string(),
        )),
        MemoryVoter::new(4, 1),
        MemoryVoter::new(5, 1),
    ]);
    let config = RaftConfig::with_voters(vec![1, 2, 3, 4, 5]);

    let result = steps::run_election(
        config,
        cluster.proxy_factory(),
        steps::vote_request(1, 2, (1, 1)),
    );

    //misbehaving peers count as denials, the remaining voters still make a majority
    assert_eq!(ElectionVote::Granted, result.decision);
    assert_eq!(Some(1), cluster.voter(4).expect("voter exists").voted_for);
    assert_eq!(Some(1), cluster.voter(5).expect("voter exists").voted_for);

    cluster.terminate();

    let cluster = InProcCluster::start(vec![
        MemoryVoter::new(2, 1).with_behaviour(VoterBehaviour::WrongIdentity(7)),
        MemoryVoter::new(3, 1).with_behaviour(VoterBehaviour::GroupError(
            "Group is not hosted".to_string(),
        )),
    ]);
    let config = RaftConfig::with_voters(vec![1, 2, 3]);

    let result = steps::run_election(
        config,
        cluster.proxy_factory(),
        steps::vote_request(1, 2, (1, 1)),
    );

    assert_eq!(ElectionVote::Denied, result.decision);

    cluster.terminate();
}

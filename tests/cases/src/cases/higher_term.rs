use crate::steps;
use raft_election::{ElectionVote, RaftConfig};
use raft_modules::{InProcCluster, MemoryVoter, VoterBehaviour};

pub fn run() {
    let cluster = InProcCluster::start(vec![
        MemoryVoter::new(2, 9),
        MemoryVoter::new(3, 3).with_behaviour(VoterBehaviour::Unresponsive),
    ]);
    let config = RaftConfig::with_voters(vec![1, 2, 3]);

    let result = steps::run_election(
        config,
        cluster.proxy_factory(),
        steps::vote_request(1, 4, (3, 7)),
    );

    assert_eq!(ElectionVote::Denied, result.decision);
    assert_eq!(9, result.highest_voter_term);
    assert_eq!(4, result.election_term());
    assert!(result.message.contains("higher term"));
    assert!(result.message.contains("INVALID_TERM"));

    let voter = cluster.voter(2).expect("voter exists");
    assert_eq!(9, voter.current_term);

    cluster.terminate();
}

use crate::steps;
use raft_election::{ElectionVote, RaftConfig};
use raft_modules::{InProcCluster, MemoryVoter, VoterBehaviour};

pub fn run() {
    let cluster = InProcCluster::start(vec![
        MemoryVoter::new(2, 2).with_log(1, 3),
        MemoryVoter::new(3, 2).with_log(1, 5),
        MemoryVoter::new(4, 1).with_log(1, 2),
        MemoryVoter::new(5, 2).with_behaviour(VoterBehaviour::Unresponsive),
    ]);
    let config = RaftConfig::with_voters(vec![1, 2, 3, 4, 5]);

    let result = steps::run_election(
        config,
        cluster.proxy_factory(),
        steps::vote_request(1, 3, (1, 5)),
    );

    assert_eq!(ElectionVote::Granted, result.decision);
    assert_eq!(3, result.highest_voter_term);

    //the decision arrives once two peers granted their votes
    let granted_voters = vec![2, 3, 4]
        .into_iter()
        .filter_map(|id| cluster.voter(id))
        .filter(|voter| voter.voted_for == Some(1) && voter.current_term == 3)
        .count();
    assert!(granted_voters >= 2);

    let silent_voter = cluster.voter(5).expect("voter exists");
    assert_eq!(None, silent_voter.voted_for);

    cluster.terminate();
}

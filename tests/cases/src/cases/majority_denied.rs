use crate::steps;
use raft_election::{ElectionVote, RaftConfig};
use raft_modules::{InProcCluster, MemoryVoter};

pub fn run() {
    let cluster = InProcCluster::start(vec![
        MemoryVoter::new(2, 2).with_log(2, 10),
        MemoryVoter::new(3, 2).with_log(2, 10),
        MemoryVoter::new(4, 2).with_log(2, 10),
        MemoryVoter::new(5, 2).with_log(1, 1),
    ]);
    let config = RaftConfig::with_voters(vec![1, 2, 3, 4, 5]);

    let result = steps::run_election(
        config,
        cluster.proxy_factory(),
        steps::vote_request(1, 3, (1, 5)),
    );

    assert_eq!(ElectionVote::Denied, result.decision);
    assert_eq!("could not achieve majority", result.message);
    assert_eq!(3, result.highest_voter_term);

    //voters with a newer log move to the candidate term without voting
    for id in vec![2, 3, 4] {
        let voter = cluster.voter(id).expect("voter exists");
        assert_eq!(3, voter.current_term);
        assert_eq!(None, voter.voted_for);
    }

    cluster.terminate();
}

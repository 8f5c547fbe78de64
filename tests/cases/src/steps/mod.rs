use crossbeam_channel::{Receiver, Sender};
use raft_election::{
    ElectionLimits, ElectionResult, ElectionVote, LeaderElection, PeerProxyFactory, RaftConfig,
    VoteCounter, VoteRequest,
};
use std::time::Duration;

pub const GROUP_ID: u64 = 100;

pub fn election_limits() -> ElectionLimits {
    ElectionLimits {
        vote_request_timeout: Duration::from_millis(300),
    }
}

pub fn decision_timeout() -> Duration {
    Duration::from_secs(5)
}

pub fn vote_request(candidate_id: u64, term: u64, last_log: (u64, u64)) -> VoteRequest {
    let (last_log_term, last_log_index) = last_log;

    VoteRequest {
        group_id: GROUP_ID,
        candidate_id,
        candidate_term: term,
        is_pre_election: false,
        ignore_live_leader: false,
        last_log_term,
        last_log_index,
        dest_id: None,
    }
}

pub fn pre_vote_request(candidate_id: u64, term: u64, last_log: (u64, u64)) -> VoteRequest {
    VoteRequest {
        is_pre_election: true,
        ..vote_request(candidate_id, term, last_log)
    }
}

/// Starts an election on behalf of the candidate and returns the channel the decision arrives on.
/// The candidate's vote is registered before the run.
pub fn start_election<F: PeerProxyFactory>(
    config: RaftConfig,
    proxy_factory: F,
    request: VoteRequest,
    limits: ElectionLimits,
) -> Receiver<ElectionResult> {
    let mut vote_counter = VoteCounter::new(config.voter_count(), config.majority_size());
    vote_counter
        .register_vote(request.candidate_id, ElectionVote::Granted)
        .expect("candidate can vote for itself");

    let (result_tx, result_rx): (Sender<ElectionResult>, Receiver<ElectionResult>) =
        crossbeam_channel::unbounded();

    let election = LeaderElection::new(
        config,
        proxy_factory,
        request,
        vote_counter,
        limits.vote_request_timeout,
        Box::new(move |result| {
            result_tx.send(result).expect("can send election result");
        }),
    );
    election.run();

    result_rx
}

/// Runs an election with the default limits and waits for its decision.
pub fn run_election<F: PeerProxyFactory>(
    config: RaftConfig,
    proxy_factory: F,
    request: VoteRequest,
) -> ElectionResult {
    run_election_with_limits(config, proxy_factory, request, election_limits())
}

pub fn run_election_with_limits<F: PeerProxyFactory>(
    config: RaftConfig,
    proxy_factory: F,
    request: VoteRequest,
    limits: ElectionLimits,
) -> ElectionResult {
    let result_rx = start_election(config, proxy_factory, request, limits);

    let result = result_rx
        .recv_timeout(decision_timeout())
        .expect("election is decided");
    info!(
        "Election for term {} decided: {} ({})",
        result.election_term(),
        result.decision,
        result.message
    );

    assert!(
        result_rx.try_recv().is_err(),
        "election decision is delivered once"
    );

    result
}

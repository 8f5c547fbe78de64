use std::cmp;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::vote_counter::VoteCounter;
use super::ElectionVote;
use crate::communication::peers::{PeerProxy, PeerProxyFactory, VoteOutcome, VoteRequest};
use crate::configuration::cluster::{MemberType, RaftConfig};
use crate::errors::RaftError;


/// Receives the terminal result of an election. Called exactly once.
pub type ElectionDecisionCallback = Box<dyn FnOnce(ElectionResult) + Send + 'static>;

/// Terminal outcome of one election attempt.
#[derive(Clone, Debug)]
pub struct ElectionResult {
    /// Request the candidate sent to its peers.
    pub vote_request: VoteRequest,

    pub decision: ElectionVote,

    /// Highest term reported by the voters, or the term that cancelled the election.
    pub highest_voter_term: u64,

    /// Short explanation of the decision.
    pub message: String,

    pub start_time: Instant,
}

impl ElectionResult {
    fn new(
        vote_request: VoteRequest,
        decision: ElectionVote,
        highest_voter_term: u64,
        message: String,
        start_time: Instant,
    ) -> ElectionResult {
        debug_assert!(!message.is_empty());

        ElectionResult {
            vote_request,
            decision,
            highest_voter_term,
            message,
            start_time,
        }
    }

    pub fn won(&self) -> bool {
        self.decision == ElectionVote::Granted
    }

    pub fn election_term(&self) -> u64 {
        self.vote_request.candidate_term
    }
}

struct VoterState<P> {
    peer_id: u64,
    proxy: Result<Arc<P>, RaftError>,
    request: Option<VoteRequest>,
    outcome: Option<VoteOutcome>,
}

impl<P: PeerProxy> VoterState<P> {
    fn peer_info(&self) -> String {
        match &self.proxy {
            Ok(proxy) => format!("{} ({})", self.peer_id, proxy.peer_name()),
            Err(_) => self.peer_id.to_string(),
        }
    }
}

struct ElectionState<P> {
    vote_counter: VoteCounter,
    voter_state: HashMap<u64, VoterState<P>>,
    started: bool,
    start_time: Instant,
    highest_voter_term: u64,
    result: Option<ElectionResult>,
    has_responded: bool,
    decision_callback: Option<ElectionDecisionCallback>,
}

enum ResponseVerdict {
    Vote(ElectionVote),
    HigherTerm { term: u64, denial: String },
}

/// Drives a single election: asks every other voter for its vote, counts the answers and reports
/// the decision once.
///
/// The candidate registers its own vote in the `VoteCounter` before construction. Completion
/// callbacks of in-flight requests keep the election alive through their own `Arc` handle, so the
/// owner may drop its handle right after `run()`.
pub struct LeaderElection<F: PeerProxyFactory> {
    config: RaftConfig,
    proxy_factory: F,
    request: VoteRequest,
    timeout: Duration,
    state: Mutex<ElectionState<F::Proxy>>,
}

impl<F: PeerProxyFactory> LeaderElection<F> {
    pub fn new(
        config: RaftConfig,
        proxy_factory: F,
        request: VoteRequest,
        vote_counter: VoteCounter,
        timeout: Duration,
        decision_callback: ElectionDecisionCallback,
    ) -> Arc<LeaderElection<F>> {
        let state = ElectionState {
            vote_counter,
            voter_state: HashMap::new(),
            started: false,
            start_time: Instant::now(),
            highest_voter_term: 0,
            result: None,
            has_responded: false,
            decision_callback: Some(decision_callback),
        };

        Arc::new(LeaderElection {
            config,
            proxy_factory,
            request,
            timeout,
            state: Mutex::new(state),
        })
    }

    pub fn election_term(&self) -> u64 {
        self.request.candidate_term
    }

    /// Starts the election and returns without waiting for the peers.
    pub fn run(self: &Arc<Self>) {
        debug!("{}Running leader election.", self.log_prefix());

        let mut voter_state = HashMap::new();
        let mut other_voter_ids = Vec::new();
        for peer in self.config.peers() {
            if peer.id == self.request.candidate_id {
                debug_assert_eq!(
                    MemberType::Voter,
                    peer.member_type,
                    "non-voter member {} tried to start an election; Raft config {:?}",
                    peer.id,
                    self.config
                );
                continue;
            }
            if peer.member_type != MemberType::Voter {
                continue;
            }
            other_voter_ids.push(peer.id);

            let proxy = self.proxy_factory.new_proxy(peer).map(Arc::new);
            voter_state.insert(
                peer.id,
                VoterState {
                    peer_id: peer.id,
                    proxy,
                    request: None,
                    outcome: None,
                },
            );
        }

        {
            let mut state = self.state.lock();
            assert!(!state.started, "Leader election can be run only once");
            state.started = true;
            state.start_time = Instant::now();
            state.voter_state = voter_state;

            assert_eq!(
                1,
                state.vote_counter.total_votes_counted(),
                "Candidate must vote for itself first"
            );
            assert_eq!(
                state.vote_counter.total_votes_counted() + other_voter_ids.len() as u32,
                state.vote_counter.total_expected_votes(),
                "Expected different number of voters. Voter ids: [{}]; Raft config: {:?}",
                join_ids(&other_voter_ids),
                self.config
            );
        }

        // single voter configurations are decided by the self-vote
        self.check_for_decision();

        let mut other_voter_info = Vec::with_capacity(other_voter_ids.len());
        for voter_id in other_voter_ids {
            let (proxy, peer_info, request) = {
                let mut state = self.state.lock();
                let voter = match state.voter_state.get_mut(&voter_id) {
                    Some(voter) => voter,
                    None => {
                        error!("{}No voter state for peer {}", self.log_prefix(), voter_id);
                        continue;
                    }
                };

                let mut request = self.request;
                request.dest_id = Some(voter_id);
                voter.request = Some(request);

                (voter.proxy.clone(), voter.peer_info(), request)
            };
            other_voter_info.push(peer_info.clone());

            let proxy = match proxy {
                Ok(proxy) => proxy,
                Err(err) => {
                    warn!(
                        "{}Was unable to construct an RPC proxy to peer {}: {}. Counting it as a 'NO' vote.",
                        self.log_prefix(),
                        peer_info,
                        err
                    );
                    {
                        let mut state = self.state.lock();
                        let vote = ElectionVote::Denied;
                        self.record_vote_unlocked(&mut state, voter_id, &peer_info, vote);
                    }
                    self.check_for_decision();
                    continue;
                }
            };

            let election = Arc::clone(self);
            proxy.request_vote_async(
                request,
                self.timeout,
                Box::new(move |outcome| election.vote_response_rpc_callback(voter_id, outcome)),
            );
        }

        info!(
            "{}Requested {}vote from peers {}",
            self.log_prefix(),
            if self.request.is_pre_election { "pre-" } else { "" },
            other_voter_info.join(", ")
        );
    }

    fn vote_response_rpc_callback(&self, voter_id: u64, outcome: VoteOutcome) {
        {
            let mut state = self.state.lock();

            let (peer_info, addressed_id) = match state.voter_state.get_mut(&voter_id) {
                Some(voter) => {
                    if voter.outcome.is_some() {
                        error!(
                            "{}Second response from peer {}",
                            self.log_prefix(),
                            voter.peer_info()
                        );
                    }
                    let addressed_id = voter
                        .request
                        .and_then(|request| request.dest_id)
                        .unwrap_or(voter_id);
                    (voter.peer_info(), addressed_id)
                }
                None => {
                    error!(
                        "{}Vote response from unknown peer {}",
                        self.log_prefix(),
                        voter_id
                    );
                    return;
                }
            };

            let verdict = self.evaluate_response(
                &mut state.highest_voter_term,
                addressed_id,
                &peer_info,
                &outcome,
            );

            if let Some(voter) = state.voter_state.get_mut(&voter_id) {
                voter.outcome = Some(outcome);
            }

            match verdict {
                ResponseVerdict::Vote(vote) => {
                    self.record_vote_unlocked(&mut state, voter_id, &peer_info, vote)
                }
                ResponseVerdict::HigherTerm { term, denial } => {
                    self.handle_higher_term_unlocked(&mut state, &peer_info, term, denial)
                }
            }
        }

        self.check_for_decision();
    }

    fn evaluate_response(
        &self,
        highest_voter_term: &mut u64,
        addressed_id: u64,
        peer_info: &str,
        outcome: &VoteOutcome,
    ) -> ResponseVerdict {
        let response = match outcome {
            Err(err) => {
                warn!(
                    "{}RPC error from VoteRequest() call to peer {}: {}",
                    self.log_prefix(),
                    peer_info,
                    err
                );
                return ResponseVerdict::Vote(ElectionVote::Denied);
            }
            Ok(response) => response,
        };

        if let Some(err) = &response.error {
            warn!(
                "{}Group error from VoteRequest() call to peer {}: {}",
                self.log_prefix(),
                peer_info,
                err
            );
            return ResponseVerdict::Vote(ElectionVote::Denied);
        }

        // configuration is inconsistent, the vote cannot be trusted
        if response.responder_id != addressed_id {
            error!(
                "{}{}: peer id mismatch from VoteRequest(): expected {}; actual {}",
                self.log_prefix(),
                peer_info,
                addressed_id,
                response.responder_id
            );
            return ResponseVerdict::Vote(ElectionVote::Denied);
        }

        if let Some(term) = response.responder_term {
            *highest_voter_term = cmp::max(*highest_voter_term, term);
        }

        if response.vote_granted {
            if !self.request.is_pre_election && response.responder_term != Some(self.election_term())
            {
                warn!(
                    "{}Vote granted by peer {} with unexpected term {:?}",
                    self.log_prefix(),
                    peer_info,
                    response.responder_term
                );
            }
            debug!("{}Vote granted by peer {}", self.log_prefix(), peer_info);
            return ResponseVerdict::Vote(ElectionVote::Granted);
        }

        match response.responder_term {
            Some(term) if term > self.election_term() => ResponseVerdict::HigherTerm {
                term,
                denial: response.denial_message(),
            },
            _ => {
                debug!(
                    "{}Vote denied by peer {}. Message: {}",
                    self.log_prefix(),
                    peer_info,
                    response.denial_message()
                );
                ResponseVerdict::Vote(ElectionVote::Denied)
            }
        }
    }

    fn record_vote_unlocked(
        &self,
        state: &mut ElectionState<F::Proxy>,
        voter_id: u64,
        peer_info: &str,
        vote: ElectionVote,
    ) {
        match state.vote_counter.register_vote(voter_id, vote) {
            Err(err) => warn!(
                "{}Error registering vote for peer {}: {}",
                self.log_prefix(),
                peer_info,
                err
            ),
            // vote requests are never retried
            Ok(true) => error!(
                "{}Duplicate vote received from peer {}",
                self.log_prefix(),
                peer_info
            ),
            Ok(false) => {}
        }
    }

    fn handle_higher_term_unlocked(
        &self,
        state: &mut ElectionState<F::Proxy>,
        peer_info: &str,
        term: u64,
        denial: String,
    ) {
        let message = format!(
            "Vote denied by peer {} with higher term. Message: {}",
            peer_info, denial
        );
        info!("{}{}", self.log_prefix(), message);

        if state.result.is_none() {
            info!(
                "{}Cancelling election due to peer responding with higher term",
                self.log_prefix()
            );
            state.result = Some(ElectionResult::new(
                self.request,
                ElectionVote::Denied,
                term,
                message,
                state.start_time,
            ));
        }
    }

    fn check_for_decision(&self) {
        let to_respond = {
            let mut state = self.state.lock();

            if state.result.is_none() && state.vote_counter.is_decided() {
                let decision = state
                    .vote_counter
                    .decision()
                    .expect("decided vote counter has a decision");
                let election_won = decision == ElectionVote::Granted;

                info!(
                    "{}Election decided. Result: candidate {}. Election summary: {}",
                    self.log_prefix(),
                    if election_won { "won" } else { "lost" },
                    state.vote_counter.election_summary()
                );

                let message = if election_won {
                    "achieved majority votes"
                } else {
                    "could not achieve majority"
                };
                let result = ElectionResult::new(
                    self.request,
                    decision,
                    state.highest_voter_term,
                    message.to_string(),
                    state.start_time,
                );
                state.result = Some(result);
            }

            if state.result.is_some() && !state.has_responded {
                state.has_responded = true;
                match (state.decision_callback.take(), state.result.clone()) {
                    (Some(callback), Some(result)) => Some((callback, result)),
                    _ => None,
                }
            } else {
                None
            }
        };

        if let Some((callback, result)) = to_respond {
            callback(result);
        }
    }

    fn log_prefix(&self) -> String {
        format!(
            "T {} P {} [CANDIDATE]: Term {} {}election: ",
            self.request.group_id,
            self.request.candidate_id,
            self.request.candidate_term,
            if self.request.is_pre_election { "pre-" } else { "" }
        )
    }
}

impl<F: PeerProxyFactory> Drop for LeaderElection<F> {
    fn drop(&mut self) {
        let has_responded = self.state.get_mut().has_responded;

        if !has_responded && !thread::panicking() {
            error!("{}Election dropped before a decision", self.log_prefix());
            debug_assert!(has_responded, "decision callback must be called exactly once");
        }
    }
}

impl<F: PeerProxyFactory> fmt::Debug for LeaderElection<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LeaderElection")
            .field("config", &self.config)
            .field("request", &self.request)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

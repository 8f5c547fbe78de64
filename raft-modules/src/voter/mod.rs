use std::sync::Arc;

use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use raft_election::{new_err, ConsensusError, ConsensusErrorCode, VoteRequest, VoteResponse};

use crate::communication::inproc::inproc_peer_proxy::VoteEnvelope;

/// Response mode of a voter, the default answers by the Raft rules.
#[derive(Clone, Debug, PartialEq)]
pub enum VoterBehaviour {
    Normal,
    /// Keeps requests unanswered until the transport times out.
    Unresponsive,
    /// Answers by the rules but reports another responder id.
    WrongIdentity(u64),
    /// Reports a group-level error instead of a vote.
    GroupError(String),
}

/// In-memory voting state of a single peer.
#[derive(Clone, Debug)]
pub struct MemoryVoter {
    pub id: u64,
    pub current_term: u64,
    pub voted_for: Option<u64>,
    pub last_log_term: u64,
    pub last_log_index: u64,
    pub has_live_leader: bool,
    pub behaviour: VoterBehaviour,
}

impl MemoryVoter {
    pub fn new(id: u64, current_term: u64) -> MemoryVoter {
        MemoryVoter {
            id,
            current_term,
            voted_for: None,
            last_log_term: 0,
            last_log_index: 0,
            has_live_leader: false,
            behaviour: VoterBehaviour::Normal,
        }
    }

    pub fn with_log(mut self, last_log_term: u64, last_log_index: u64) -> MemoryVoter {
        self.last_log_term = last_log_term;
        self.last_log_index = last_log_index;
        self
    }

    pub fn with_vote(mut self, voted_for: u64) -> MemoryVoter {
        self.voted_for = Some(voted_for);
        self
    }

    pub fn with_live_leader(mut self) -> MemoryVoter {
        self.has_live_leader = true;
        self
    }

    pub fn with_behaviour(mut self, behaviour: VoterBehaviour) -> MemoryVoter {
        self.behaviour = behaviour;
        self
    }

    /// Returns `None` when the voter keeps silent.
    pub fn handle_vote_request(&mut self, request: VoteRequest) -> Option<VoteResponse> {
        match self.behaviour.clone() {
            VoterBehaviour::Normal => Some(self.process_vote_request(request)),
            VoterBehaviour::Unresponsive => None,
            VoterBehaviour::WrongIdentity(responder_id) => {
                let mut response = self.process_vote_request(request);
                response.responder_id = responder_id;
                Some(response)
            }
            VoterBehaviour::GroupError(text) => {
                let err = new_err::<()>(text, format!("group {}", request.group_id));
                err.err().map(|err| VoteResponse::failed(self.id, err))
            }
        }
    }

    /// Applies the Raft voting rules. Pre-election requests never change the voter state.
    pub fn process_vote_request(&mut self, request: VoteRequest) -> VoteResponse {
        if request.candidate_term < self.current_term {
            return self.deny(
                ConsensusErrorCode::InvalidTerm,
                format!(
                    "Denying vote to candidate {} for earlier term {}. Current term is {}",
                    request.candidate_id, request.candidate_term, self.current_term
                ),
            );
        }

        if self.has_live_leader && !request.ignore_live_leader {
            return self.deny(
                ConsensusErrorCode::LeaderIsAlive,
                format!(
                    "Denying vote to candidate {} for term {}: leader is alive",
                    request.candidate_id, request.candidate_term
                ),
            );
        }

        if request.candidate_term > self.current_term && !request.is_pre_election {
            self.current_term = request.candidate_term;
            self.voted_for = None;
        }

        if request.candidate_term == self.current_term {
            if let Some(voted_for) = self.voted_for {
                if voted_for != request.candidate_id {
                    return self.deny(
                        ConsensusErrorCode::AlreadyVoted,
                        format!(
                            "Denying vote to candidate {} in current term {}: already voted for candidate {}",
                            request.candidate_id, self.current_term, voted_for
                        ),
                    );
                }
            }
        }

        if !self.check_candidate_last_log_entry(request.last_log_term, request.last_log_index) {
            return self.deny(
                ConsensusErrorCode::LastOpIdTooOld,
                format!(
                    "Denying vote to candidate {} for term {} because replica has last log entry \
                     (term={}, index={}), which is greater than the candidate's (term={}, index={})",
                    request.candidate_id,
                    request.candidate_term,
                    self.last_log_term,
                    self.last_log_index,
                    request.last_log_term,
                    request.last_log_index
                ),
            );
        }

        if !request.is_pre_election {
            self.voted_for = Some(request.candidate_id);
        }

        debug!(
            "Node {} granted {}vote to candidate {} for term {}",
            self.id,
            if request.is_pre_election { "pre-" } else { "" },
            request.candidate_id,
            request.candidate_term
        );
        VoteResponse::granted(self.id, self.current_term)
    }

    //Compares term first, index afterwards.
    fn check_candidate_last_log_entry(
        &self,
        candidate_last_log_term: u64,
        candidate_last_log_index: u64,
    ) -> bool {
        if self.last_log_term > candidate_last_log_term {
            return false;
        }
        if self.last_log_term < candidate_last_log_term {
            return true;
        }
        //equal terms
        self.last_log_index <= candidate_last_log_index
    }

    fn deny(&self, code: ConsensusErrorCode, message: String) -> VoteResponse {
        debug!("Node {}: {}", self.id, message);

        VoteResponse::denied(self.id, self.current_term, ConsensusError { code, message })
    }
}

#[derive(Debug)]
pub struct VoterWorkerParams {
    pub voter: Arc<Mutex<MemoryVoter>>,
    pub request_rx: Receiver<VoteEnvelope>,
}

/// Answers vote requests until termination. Silent voters drop the request, its caller gets the
/// transport timeout.
pub fn serve_vote_requests(params: VoterWorkerParams, terminate_worker_rx: Receiver<()>) {
    let voter_id = params.voter.lock().id;

    loop {
        select!(
            recv(params.request_rx) -> res => {
                let envelope = match res {
                    Ok(envelope) => envelope,
                    Err(_) => {
                        info!("Node {} vote request channel closed", voter_id);
                        return;
                    }
                };
                trace!("Node {} Received {}", voter_id, envelope.request);

                let response = params.voter.lock().handle_vote_request(envelope.request);
                match response {
                    Some(response) => {
                        trace!("Node {} Sending response {:?}", voter_id, response);
                        envelope.reply.send(response);
                    },
                    None => {
                        trace!("Node {} keeps silent", voter_id);
                    }
                }
            },
            recv(terminate_worker_rx) -> _ => {
                info!("Node {} vote request processing stopped", voter_id);
                return;
            }
        );
    }
}

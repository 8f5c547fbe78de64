use std::time::Duration;

use derive_more::Display;

use crate::errors::RaftError;
use crate::RaftPeer;

/// Candidate's request for a vote. `dest_id` is filled per recipient.
#[derive(Clone, Copy, Debug, Display, PartialEq)]
#[display(
    fmt = "Vote request (group={}, candidate={}, term={}, pre_election={}, last_log_term={}, last_log_index={})",
    group_id,
    candidate_id,
    candidate_term,
    is_pre_election,
    last_log_term,
    last_log_index
)]
pub struct VoteRequest {
    pub group_id: u64,
    pub candidate_id: u64,
    pub candidate_term: u64,
    pub is_pre_election: bool,
    pub ignore_live_leader: bool,
    pub last_log_term: u64,
    pub last_log_index: u64,
    pub dest_id: Option<u64>,
}

/// Reason a voter gave for denying its vote.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash)]
pub enum ConsensusErrorCode {
    #[display(fmt = "INVALID_TERM")]
    InvalidTerm,
    #[display(fmt = "LAST_OPID_TOO_OLD")]
    LastOpIdTooOld,
    #[display(fmt = "ALREADY_VOTED")]
    AlreadyVoted,
    #[display(fmt = "LEADER_IS_ALIVE")]
    LeaderIsAlive,
}

#[derive(Clone, Debug, Display, PartialEq)]
#[display(fmt = "{}: {}", code, message)]
pub struct ConsensusError {
    pub code: ConsensusErrorCode,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VoteResponse {
    pub responder_id: u64,
    pub responder_term: Option<u64>,
    pub vote_granted: bool,
    /// Group-level failure on the responder, the vote payload is meaningless when set.
    pub error: Option<RaftError>,
    pub consensus_error: Option<ConsensusError>,
}

impl VoteResponse {
    pub fn granted(responder_id: u64, responder_term: u64) -> VoteResponse {
        VoteResponse {
            responder_id,
            responder_term: Some(responder_term),
            vote_granted: true,
            error: None,
            consensus_error: None,
        }
    }

    pub fn denied(
        responder_id: u64,
        responder_term: u64,
        consensus_error: ConsensusError,
    ) -> VoteResponse {
        VoteResponse {
            responder_id,
            responder_term: Some(responder_term),
            vote_granted: false,
            error: None,
            consensus_error: Some(consensus_error),
        }
    }

    pub fn failed(responder_id: u64, error: RaftError) -> VoteResponse {
        VoteResponse {
            responder_id,
            responder_term: None,
            vote_granted: false,
            error: Some(error),
            consensus_error: None,
        }
    }

    pub(crate) fn denial_message(&self) -> String {
        match &self.consensus_error {
            Some(err) => err.to_string(),
            None => "no reason given".to_string(),
        }
    }
}

/// Terminal outcome of one vote RPC: the response payload or a transport failure.
pub type VoteOutcome = Result<VoteResponse, RaftError>;

/// Completion of a vote RPC. Invoked exactly once per dispatched request.
pub type VoteResponseCallback = Box<dyn FnOnce(VoteOutcome) + Send + 'static>;

/// Sends vote requests to a single peer.
pub trait PeerProxy: Send + Sync + 'static {
    /// Human readable peer name, usually the address.
    fn peer_name(&self) -> String;

    /// Dispatches the request without blocking. The transport enforces the timeout and must call
    /// `on_complete` once with the response, or with an error on failure or timeout.
    fn request_vote_async(
        &self,
        request: VoteRequest,
        timeout: Duration,
        on_complete: VoteResponseCallback,
    );
}

pub trait PeerProxyFactory: Send + Sync + 'static {
    type Proxy: PeerProxy;

    fn new_proxy(&self, peer: &RaftPeer) -> Result<Self::Proxy, RaftError>;
}

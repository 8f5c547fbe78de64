use core::fmt;
use std::error::Error;

use derive_more::Display;

use crate::leadership::ElectionVote;

/// Generic failure of an election collaborator: proxy construction, transport or a
/// group-level error reported by the responder.
#[derive(Clone, Debug, PartialEq)]
pub struct RaftError {
    text: String,
    cause: String,
}

pub(crate) type Result<T> = std::result::Result<T, RaftError>;

/// Creates a `RaftError` wrapped in `Err`.
pub fn new_err<T>(text: String, cause: String) -> Result<T> {
    Err(RaftError { text, cause })
}

impl fmt::Display for RaftError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let cause_word = {
            if !self.cause.is_empty() {
                " Cause: ".to_string()
            } else {
                String::new()
            }
        };
        write!(f, "{}.{}{}", self.text, cause_word, self.cause)
    }
}

impl Error for RaftError {}

/// Rejected vote registrations.
#[derive(Clone, Debug, Display, PartialEq)]
pub enum VoteCounterError {
    #[display(
        fmt = "Peer {} voted a different way twice in the same election. First vote: {}, second vote: {}",
        voter_id,
        prior_vote,
        vote
    )]
    ConflictingVote {
        voter_id: u64,
        prior_vote: ElectionVote,
        vote: ElectionVote,
    },

    #[display(
        fmt = "Vote from peer {} would cause the number of votes to exceed the expected number of voters, which is {}. Votes already received from the following peers: {{{}}}",
        voter_id,
        num_voters,
        registered_voters
    )]
    QuorumOverflow {
        voter_id: u64,
        num_voters: u32,
        registered_voters: String,
    },

    #[display(fmt = "Vote not yet decided")]
    NotYetDecided,
}

impl Error for VoteCounterError {}

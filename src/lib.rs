//! # Raft leader election
//!
//! The candidate side of the Raft election protocol: a candidate asks its peers for votes,
//! responses are folded into a `VoteCounter` under quorum rules and the decision is delivered
//! exactly once through a user supplied callback.
//!
//! Transport and cluster membership stay outside: peers are reached through the `PeerProxy`
//! and `PeerProxyFactory` traits and the cluster is read from a `RaftConfig` snapshot.

#![warn(missing_debug_implementations, unsafe_code)]

#[macro_use]
extern crate log;

mod communication;
mod configuration;
mod errors;
mod leadership;

pub use communication::peers::{
    ConsensusError, ConsensusErrorCode, PeerProxy, PeerProxyFactory, VoteOutcome, VoteRequest,
    VoteResponse, VoteResponseCallback,
};
pub use configuration::cluster::{MemberType, RaftConfig, RaftPeer};
pub use configuration::election::ElectionLimits;
pub use errors::{new_err, RaftError, VoteCounterError};
pub use leadership::election::{ElectionDecisionCallback, ElectionResult, LeaderElection};
pub use leadership::vote_counter::VoteCounter;
pub use leadership::ElectionVote;

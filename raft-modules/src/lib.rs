//! # In-process election collaborators
//!
//! Implementations of the `raft_election` peer traits that run inside a single process:
//! an in-memory voter applying the Raft voting rules, a channel based peer transport and a
//! cluster harness owning the voter threads.

#[macro_use]
extern crate log;
#[macro_use]
extern crate crossbeam_channel;
extern crate raft_election;

mod cluster;
mod common;
mod communication;
mod voter;

pub use cluster::InProcCluster;
pub use common::{run_worker, Worker, WorkerPool};
pub use communication::inproc::inproc_peer_proxy::{
    InProcPeerProxy, InProcPeerProxyFactory, VoteEnvelope,
};
pub use voter::{serve_vote_requests, MemoryVoter, VoterBehaviour, VoterWorkerParams};

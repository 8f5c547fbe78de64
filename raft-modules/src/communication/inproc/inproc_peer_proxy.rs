use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use raft_election::{
    new_err, PeerProxy, PeerProxyFactory, RaftError, RaftPeer, VoteOutcome, VoteRequest,
    VoteResponse, VoteResponseCallback,
};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Vote request together with the reply slot of its caller.
#[derive(Debug)]
pub struct VoteEnvelope {
    pub request: VoteRequest,
    pub reply: VoteReply,
}

/// Completes a vote request once: with the voter response or with the timeout error, whichever
/// comes first. Dropping the reply without sending leaves the request to the timeout.
#[derive(Clone)]
pub struct VoteReply {
    peer_name: String,
    completion: Arc<Mutex<Option<PendingCompletion>>>,
}

struct PendingCompletion {
    on_complete: VoteResponseCallback,
    // disconnects the timeout watcher once dropped
    _completed_tx: Sender<()>,
}

impl VoteReply {
    fn new(peer_name: String, on_complete: VoteResponseCallback) -> (VoteReply, Receiver<()>) {
        let (completed_tx, completed_rx): (Sender<()>, Receiver<()>) =
            crossbeam_channel::bounded(0);

        let reply = VoteReply {
            peer_name,
            completion: Arc::new(Mutex::new(Some(PendingCompletion {
                on_complete,
                _completed_tx: completed_tx,
            }))),
        };

        (reply, completed_rx)
    }

    /// Hands the response to the caller on the rayon pool.
    pub fn send(self, response: VoteResponse) {
        rayon::spawn(move || self.complete(Ok(response)));
    }

    fn complete(&self, outcome: VoteOutcome) {
        let pending = self.completion.lock().take();

        match pending {
            Some(pending) => {
                trace!("Destination {} Response {:?}", self.peer_name, outcome);
                (pending.on_complete)(outcome);
            }
            None => trace!(
                "Destination {} Request already completed. Dropped outcome {:?}",
                self.peer_name,
                outcome
            ),
        }
    }

    fn is_completed(&self) -> bool {
        self.completion.lock().is_none()
    }
}

impl std::fmt::Debug for VoteReply {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("VoteReply")
            .field("peer_name", &self.peer_name)
            .field("completed", &self.is_completed())
            .finish()
    }
}

/// Creates proxies to the voters registered with their request channels.
#[derive(Clone, Debug, Default)]
pub struct InProcPeerProxyFactory {
    request_channels: HashMap<u64, Sender<VoteEnvelope>>,
    unreachable_peers: HashSet<u64>,
}

impl InProcPeerProxyFactory {
    pub fn new() -> InProcPeerProxyFactory {
        InProcPeerProxyFactory::default()
    }

    /// Registers a peer and returns the receiver its voter should serve.
    pub fn add_peer(&mut self, peer_id: u64) -> Receiver<VoteEnvelope> {
        let (request_tx, request_rx): (Sender<VoteEnvelope>, Receiver<VoteEnvelope>) =
            crossbeam_channel::unbounded();

        if self.request_channels.insert(peer_id, request_tx).is_some() {
            warn!("In-process transport - peer {} registered twice", peer_id);
        }

        request_rx
    }

    /// Proxy construction to the peer fails from now on.
    pub fn mark_unreachable(&mut self, peer_id: u64) {
        self.unreachable_peers.insert(peer_id);
    }
}

impl PeerProxyFactory for InProcPeerProxyFactory {
    type Proxy = InProcPeerProxy;

    fn new_proxy(&self, peer: &RaftPeer) -> Result<InProcPeerProxy, RaftError> {
        if self.unreachable_peers.contains(&peer.id) {
            return new_err(
                format!("Cannot create proxy to peer {}", peer.id),
                "peer is unreachable".to_string(),
            );
        }

        match self.request_channels.get(&peer.id) {
            Some(request_tx) => Ok(InProcPeerProxy {
                peer_id: peer.id,
                name: peer
                    .address
                    .clone()
                    .unwrap_or_else(|| format!("inproc-{}", peer.id)),
                request_tx: request_tx.clone(),
            }),
            None => new_err(
                format!("Cannot create proxy to peer {}", peer.id),
                "peer is not registered".to_string(),
            ),
        }
    }
}

/// Sends vote requests to an in-process voter. The voter replies through the envelope, a
/// watcher thread per request delivers the timeout.
#[derive(Clone, Debug)]
pub struct InProcPeerProxy {
    peer_id: u64,
    name: String,
    request_tx: Sender<VoteEnvelope>,
}

impl PeerProxy for InProcPeerProxy {
    fn peer_name(&self) -> String {
        self.name.clone()
    }

    fn request_vote_async(
        &self,
        request: VoteRequest,
        timeout: Duration,
        on_complete: VoteResponseCallback,
    ) {
        trace!("Destination Node {} Sending request {}", self.peer_id, request);

        let (reply, completed_rx) = VoteReply::new(self.name.clone(), on_complete);

        let envelope = VoteEnvelope {
            request,
            reply: reply.clone(),
        };
        if let Err(err) = self.request_tx.try_send(envelope) {
            reply.complete(new_err(
                format!("Cannot send request. Channel : {} ", self.name),
                err.to_string(),
            ));
            return;
        }

        let name = self.name.clone();
        thread::spawn(move || {
            select!(
                recv(completed_rx) -> _ => {},
                recv(crossbeam_channel::after(timeout)) -> _ => {
                    reply.complete(new_err(
                        format!("Cannot receive response. Channel : {}", name),
                        format!("no response within {:?}", timeout),
                    ));
                }
            );
        });
    }
}

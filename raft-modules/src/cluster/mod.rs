use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::common::{run_worker, WorkerPool};
use crate::communication::inproc::inproc_peer_proxy::InProcPeerProxyFactory;
use crate::voter::{serve_vote_requests, MemoryVoter, VoterWorkerParams};

/// Group of in-memory voters, each served by its own worker thread.
#[derive(Debug)]
pub struct InProcCluster {
    voters: HashMap<u64, Arc<Mutex<MemoryVoter>>>,
    proxy_factory: InProcPeerProxyFactory,
    worker_pool: WorkerPool,
}

impl InProcCluster {
    /// Starts a worker for every voter.
    pub fn start(voters: Vec<MemoryVoter>) -> InProcCluster {
        let mut proxy_factory = InProcPeerProxyFactory::new();
        let mut protected_voters = HashMap::new();
        let mut workers = Vec::new();

        for voter in voters {
            let voter_id = voter.id;
            let request_rx = proxy_factory.add_peer(voter_id);
            let protected_voter = Arc::new(Mutex::new(voter));

            workers.push(run_worker(
                serve_vote_requests,
                VoterWorkerParams {
                    voter: protected_voter.clone(),
                    request_rx,
                },
            ));
            protected_voters.insert(voter_id, protected_voter);
        }

        info!("In-process cluster started with voters {:?}", {
            let mut ids: Vec<&u64> = protected_voters.keys().collect();
            ids.sort();
            ids
        });

        InProcCluster {
            voters: protected_voters,
            proxy_factory,
            worker_pool: WorkerPool::new(workers),
        }
    }

    /// Factory producing proxies to the cluster voters.
    pub fn proxy_factory(&self) -> InProcPeerProxyFactory {
        self.proxy_factory.clone()
    }

    /// Snapshot of the voter state.
    pub fn voter(&self, voter_id: u64) -> Option<MemoryVoter> {
        self.voters
            .get(&voter_id)
            .map(|voter| voter.lock().clone())
    }

    pub fn terminate(self) {
        self.worker_pool.terminate();
        self.worker_pool.join();

        info!("In-process cluster terminated");
    }
}

use std::collections::HashSet;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum MemberType {
    Voter,
    NonVoter,
}

/// Member of the raft group as seen by the configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RaftPeer {
    pub id: u64,
    pub address: Option<String>,
    pub member_type: MemberType,
}

impl RaftPeer {
    pub fn voter(id: u64) -> RaftPeer {
        RaftPeer {
            id,
            address: None,
            member_type: MemberType::Voter,
        }
    }

    pub fn non_voter(id: u64) -> RaftPeer {
        RaftPeer {
            id,
            address: None,
            member_type: MemberType::NonVoter,
        }
    }

    pub fn with_address(mut self, address: String) -> RaftPeer {
        self.address = Some(address);
        self
    }
}

/// Read-only snapshot of the group membership used for one election.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RaftConfig {
    peers: Vec<RaftPeer>,
}

impl RaftConfig {
    /// Creates a configuration keeping the peer order. Repeated ids are dropped.
    pub fn new(peers: Vec<RaftPeer>) -> RaftConfig {
        let mut known_ids = HashSet::new();
        let mut unique_peers = Vec::with_capacity(peers.len());

        for peer in peers {
            if !known_ids.insert(peer.id) {
                warn!("Raft configuration - duplicate peer:{}", peer.id);
                continue;
            }
            unique_peers.push(peer);
        }

        RaftConfig {
            peers: unique_peers,
        }
    }

    /// Creates a configuration where every node is a voter.
    pub fn with_voters(voter_ids: Vec<u64>) -> RaftConfig {
        RaftConfig::new(voter_ids.into_iter().map(RaftPeer::voter).collect())
    }

    pub fn peers(&self) -> &[RaftPeer] {
        &self.peers
    }

    pub fn peer(&self, id: u64) -> Option<&RaftPeer> {
        self.peers.iter().find(|peer| peer.id == id)
    }

    pub fn voters(&self) -> impl Iterator<Item = &RaftPeer> {
        self.peers
            .iter()
            .filter(|peer| peer.member_type == MemberType::Voter)
    }

    pub fn is_voter(&self, id: u64) -> bool {
        self.voters().any(|peer| peer.id == id)
    }

    pub fn voter_count(&self) -> u32 {
        self.voters().count() as u32
    }

    /// Majority of the voters.
    pub fn majority_size(&self) -> u32 {
        let voter_count = self.voter_count();

        if voter_count == 0 {
            panic!("Cannot calculate majority size: voter_count = 0")
        }

        voter_count / 2 + 1
    }
}

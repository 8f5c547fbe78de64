use std::collections::BTreeMap;

use super::ElectionVote;
use crate::errors::VoteCounterError;

/// Tracks one ballot per voter and answers quorum questions.
#[derive(Clone, Debug)]
pub struct VoteCounter {
    num_voters: u32,
    majority_size: u32,
    votes: BTreeMap<u64, ElectionVote>,
    yes_votes: u32,
    no_votes: u32,
}

impl VoteCounter {
    /// Panics unless `0 < majority_size <= num_voters`.
    pub fn new(num_voters: u32, majority_size: u32) -> VoteCounter {
        if num_voters == 0 || majority_size == 0 || majority_size > num_voters {
            panic!(
                "Invalid params: num_voters : {}, majority_size : {}",
                num_voters, majority_size
            )
        }

        VoteCounter {
            num_voters,
            majority_size,
            votes: BTreeMap::new(),
            yes_votes: 0,
            no_votes: 0,
        }
    }

    /// Registers a vote. Returns `Ok(true)` when the identical vote was already registered.
    pub fn register_vote(
        &mut self,
        voter_id: u64,
        vote: ElectionVote,
    ) -> Result<bool, VoteCounterError> {
        if let Some(prior_vote) = self.votes.get(&voter_id).copied() {
            if prior_vote != vote {
                return Err(VoteCounterError::ConflictingVote {
                    voter_id,
                    prior_vote,
                    vote,
                });
            }

            return Ok(true);
        }

        if self.total_votes_counted() == self.num_voters {
            return Err(VoteCounterError::QuorumOverflow {
                voter_id,
                num_voters: self.num_voters,
                registered_voters: join_ids(self.votes.keys().copied()),
            });
        }

        self.votes.insert(voter_id, vote);
        match vote {
            ElectionVote::Granted => self.yes_votes += 1,
            ElectionVote::Denied => self.no_votes += 1,
        }

        Ok(false)
    }

    /// True once a majority granted, or once a majority can no longer be reached.
    pub fn is_decided(&self) -> bool {
        self.yes_votes >= self.majority_size || self.no_votes > self.num_voters - self.majority_size
    }

    pub fn decision(&self) -> Result<ElectionVote, VoteCounterError> {
        if self.yes_votes >= self.majority_size {
            return Ok(ElectionVote::Granted);
        }
        if self.no_votes > self.num_voters - self.majority_size {
            return Ok(ElectionVote::Denied);
        }

        Err(VoteCounterError::NotYetDecided)
    }

    pub fn total_votes_counted(&self) -> u32 {
        self.yes_votes + self.no_votes
    }

    pub fn total_expected_votes(&self) -> u32 {
        self.num_voters
    }

    pub fn majority_size(&self) -> u32 {
        self.majority_size
    }

    pub fn yes_votes(&self) -> u32 {
        self.yes_votes
    }

    pub fn no_votes(&self) -> u32 {
        self.no_votes
    }

    pub fn are_all_votes_in(&self) -> bool {
        self.total_votes_counted() == self.num_voters
    }

    pub fn election_summary(&self) -> String {
        let granted = self
            .votes
            .iter()
            .filter(|(_, vote)| **vote == ElectionVote::Granted)
            .map(|(id, _)| *id);
        let denied = self
            .votes
            .iter()
            .filter(|(_, vote)| **vote == ElectionVote::Denied)
            .map(|(id, _)| *id);

        format!(
            "received {} responses out of {} voters: {} yes votes; {} no votes. \
             yes voters: {}; no voters: {}",
            self.total_votes_counted(),
            self.num_voters,
            self.yes_votes,
            self.no_votes,
            join_ids(granted),
            join_ids(denied)
        )
    }
}

fn join_ids(ids: impl Iterator<Item = u64>) -> String {
    ids.map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}

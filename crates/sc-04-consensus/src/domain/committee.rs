//! Committee snapshot for one chain.

use super::errors::{ConsensusError, ConsensusResult};
use shared_types::PublicKey;
use std::collections::HashSet;

/// Ordered validator keys of one chain, read from chain state for a round.
///
/// Never empty and never holds the same key twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitteeSet {
    members: Vec<PublicKey>,
}

impl CommitteeSet {
    /// Validate and wrap a committee snapshot.
    pub fn new(members: Vec<PublicKey>) -> ConsensusResult<Self> {
        if members.is_empty() {
            return Err(ConsensusError::EmptyCommittee);
        }
        let mut seen = HashSet::with_capacity(members.len());
        for key in &members {
            if !seen.insert(key) {
                return Err(ConsensusError::DuplicateMember(key.to_base58()));
            }
        }
        Ok(Self { members })
    }

    /// Members in committee order.
    pub fn members(&self) -> &[PublicKey] {
        &self.members
    }

    /// Committee size.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Position of `key` in the committee.
    pub fn index_of(&self, key: &PublicKey) -> Option<usize> {
        self.members.iter().position(|m| m == key)
    }

    /// Whether `key` is a member.
    pub fn contains(&self, key: &PublicKey) -> bool {
        self.index_of(key).is_some()
    }

    /// Member at `index`.
    pub fn get(&self, index: usize) -> Option<&PublicKey> {
        self.members.get(index)
    }

    /// Index of the proposer at `height`.
    ///
    /// Positions count from one, so `height mod len` names a position and
    /// position 0 wraps to the last member. Equivalently, the rotation is
    /// keyed on the parent height: index `(height - 1) mod len`.
    pub fn proposer_index(&self, height: u64) -> usize {
        let len = self.members.len() as u64;
        ((height % len + len - 1) % len) as usize
    }

    /// Proposer at `height`.
    pub fn proposer_at(&self, height: u64) -> &PublicKey {
        &self.members[self.proposer_index(height)]
    }

    /// Base58 rendering of every member, for status reports.
    pub fn to_base58(&self) -> Vec<String> {
        self.members.iter().map(PublicKey::to_base58).collect()
    }
}

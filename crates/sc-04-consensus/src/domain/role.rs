//! Role resolution.
//!
//! A role is a pure function of (committee, key, height, chain kind). Every
//! honest node computes the same proposer for a height without talking to
//! anyone.

use super::committee::CommitteeSet;
use serde::{Deserialize, Serialize};
use shared_types::{Chain, ChainKind, PublicKey};
use std::fmt;
use std::str::FromStr;

/// Part a node plays in a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    /// Not a member of the committee.
    #[default]
    None,
    /// Proposes the next beacon block.
    BeaconProposer,
    /// Votes on beacon blocks.
    BeaconValidator,
    /// Proposes the next shard block.
    ShardProposer,
    /// Votes on shard blocks.
    ShardValidator,
}

impl Role {
    /// Whether the node proposes this round.
    pub fn is_proposer(&self) -> bool {
        matches!(self, Role::BeaconProposer | Role::ShardProposer)
    }

    /// Whether the node takes part at all.
    pub fn is_some(&self) -> bool {
        !matches!(self, Role::None)
    }

    fn proposer(kind: ChainKind) -> Self {
        match kind {
            ChainKind::Beacon => Role::BeaconProposer,
            ChainKind::Shard => Role::ShardProposer,
        }
    }

    fn validator(kind: ChainKind) -> Self {
        match kind {
            ChainKind::Beacon => Role::BeaconValidator,
            ChainKind::Shard => Role::ShardValidator,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::None => "none",
            Role::BeaconProposer => "beacon-proposer",
            Role::BeaconValidator => "beacon-validator",
            Role::ShardProposer => "shard-proposer",
            Role::ShardValidator => "shard-validator",
        };
        f.write_str(s)
    }
}

/// Resolve the role of `key` at `height`.
///
/// The member at position `height mod len` proposes, counting positions from
/// one; every other member validates. See [`CommitteeSet::proposer_index`].
pub fn resolve_role(
    committee: &CommitteeSet,
    key: &PublicKey,
    height: u64,
    kind: ChainKind,
) -> Role {
    match committee.index_of(key) {
        None => Role::None,
        Some(idx) if idx == committee.proposer_index(height) => Role::proposer(kind),
        Some(_) => Role::validator(kind),
    }
}

/// Which chains a node takes part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeMode {
    /// Beacon committee only.
    Beacon,
    /// Shard committees only.
    Shard,
    /// Beacon when a member, otherwise any shard.
    #[default]
    Auto,
}

impl FromStr for NodeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beacon" => Ok(NodeMode::Beacon),
            "shard" => Ok(NodeMode::Shard),
            "auto" => Ok(NodeMode::Auto),
            other => Err(format!("unknown node mode: {}", other)),
        }
    }
}

impl fmt::Display for NodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeMode::Beacon => "beacon",
            NodeMode::Shard => "shard",
            NodeMode::Auto => "auto",
        };
        f.write_str(s)
    }
}

/// Role the engine settled on for one pass of its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssignedRole {
    /// Resolved role.
    pub role: Role,
    /// Chain the role is held on; `None` when the role is `None`.
    pub chain: Option<Chain>,
}

impl AssignedRole {
    /// No role on any chain.
    pub fn none() -> Self {
        Self::default()
    }
}

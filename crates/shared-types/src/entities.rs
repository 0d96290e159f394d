//! # Core Domain Entities
//!
//! Identifiers shared by the beacon chain and every shard chain.
//!
//! ## Clusters
//!
//! - **Chain**: [`Hash`], [`ShardId`], [`Chain`], [`ChainKind`]
//! - **Identity**: [`PublicKey`]

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// CLUSTER A: THE CHAIN
// =============================================================================

/// A 32-byte double-sha256 digest.
pub type Hash = [u8; 32];

/// The all-zero hash, used as the parent of genesis and as an unset marker.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Shard identifier. Serialized as a single byte in canonical encodings.
pub type ShardId = u8;

/// Which family of chain a block or committee belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainKind {
    /// The coordinating beacon chain.
    Beacon,
    /// One of the parallel shard chains.
    Shard,
}

impl fmt::Display for ChainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainKind::Beacon => write!(f, "beacon"),
            ChainKind::Shard => write!(f, "shard"),
        }
    }
}

/// A concrete chain: the beacon, or one shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Chain {
    /// The beacon chain.
    Beacon,
    /// The shard chain with the given id.
    Shard(ShardId),
}

impl Chain {
    /// The chain family.
    pub fn kind(&self) -> ChainKind {
        match self {
            Chain::Beacon => ChainKind::Beacon,
            Chain::Shard(_) => ChainKind::Shard,
        }
    }

    /// The shard id, if this is a shard chain.
    pub fn shard_id(&self) -> Option<ShardId> {
        match self {
            Chain::Beacon => None,
            Chain::Shard(id) => Some(*id),
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chain::Beacon => write!(f, "beacon"),
            Chain::Shard(id) => write!(f, "shard-{}", id),
        }
    }
}

/// Route a key's last byte to a shard.
///
/// Both transaction senders and output-coin receivers are routed with this
/// function, so a shard can predict where any coin will be consumed.
pub fn shard_for_last_byte(last_byte: u8, shard_count: u8) -> ShardId {
    if shard_count == 0 {
        return 0;
    }
    last_byte % shard_count
}

// =============================================================================
// CLUSTER B: IDENTITY
// =============================================================================

/// A validator or payment public key in its raw byte form.
///
/// The signature scheme decides the length; the consensus core only compares
/// keys and renders them as base58.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct PublicKey(pub Vec<u8>);

impl PublicKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Last byte of the key, the shard-routing key. Zero for an empty key.
    pub fn last_byte(&self) -> u8 {
        self.0.last().copied().unwrap_or(0)
    }

    /// Base58 rendering used in committee listings and status reports.
    pub fn to_base58(&self) -> String {
        bs58::encode(&self.0).into_string()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

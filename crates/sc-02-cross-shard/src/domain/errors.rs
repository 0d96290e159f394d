//! # Domain Errors
//!
//! Bundle verification failures. Every variant is a hard rejection: the
//! destination shard cannot prove which source block authorized the coins.

use shared_types::{Hash, ShardId};
use thiserror::Error;

/// Relay error types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayError {
    /// Bundle names a different source block than the one claimed.
    #[error("Bundle block hash mismatch")]
    BlockHashMismatch {
        /// Hash the verifier trusts
        claimed: Hash,
        /// Hash carried by the bundle
        carried: Hash,
    },

    /// No commitment is known for the source block and destination.
    #[error("Unknown source block for destination shard {destination}")]
    UnknownSource {
        /// Bundle destination
        destination: ShardId,
    },

    /// Recomputed ownership hash differs from the source commitment.
    #[error("Ownership hash mismatch for destination shard {destination}")]
    OwnershipMismatch {
        /// Bundle destination
        destination: ShardId,
    },

    /// Bundle carries no coins.
    #[error("Empty bundle for destination shard {0}")]
    EmptyBundle(ShardId),

    /// A coin inside the bundle routes to another shard.
    #[error("Coin routed to shard {coin_shard} inside bundle for shard {destination}")]
    MisroutedCoin {
        /// Bundle destination
        destination: ShardId,
        /// Shard the coin actually routes to
        coin_shard: ShardId,
    },

    /// A header's outbound commitment disagrees with its body.
    #[error("Outbound commitment mismatch in header field {field}")]
    OutboundMismatch {
        /// Header field
        field: &'static str,
    },
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

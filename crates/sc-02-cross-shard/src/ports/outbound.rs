//! # Outbound Ports
//!
//! Lookup of the ownership commitments published by finalized source blocks.

use shared_types::{Hash, ShardId};

/// Source of cross-shard ownership commitments - outbound port.
///
/// When a shard block is finalized, the ownership hash of each outbound
/// bundle is recorded under (block hash, destination). The beacon relays
/// these between shards; how is outside the relay.
pub trait CommitmentSource: Send + Sync {
    /// Ownership hash published for `destination` by `source_block_hash`.
    fn ownership_commitment(&self, source_block_hash: &Hash, destination: ShardId) -> Option<Hash>;
}

//! # Inbound Ports
//!
//! API trait defining what the relay can do.

use crate::domain::RelayResult;
use sc_01_block_model::{CrossOutputCoin, OutputCoin, ShardBlock};
use shared_types::{Hash, ShardId};

/// Cross-shard relay API - inbound port.
pub trait CrossShardRelayApi: Send + Sync {
    /// Group newly created outputs into untagged bundles, one per foreign
    /// destination.
    fn build_cross_shard_bundles(
        &self,
        produced_outputs: &[OutputCoin],
        current_shard: ShardId,
    ) -> Vec<CrossOutputCoin>;

    /// Check a bundle against the source block hash the caller trusts.
    fn verify_bundle(&self, bundle: &CrossOutputCoin, claimed_block_hash: &Hash) -> bool;

    /// Verify an inbound bundle against the commitment its source block
    /// published.
    fn verify_inbound(&self, bundle: &CrossOutputCoin) -> RelayResult<()>;

    /// Verify the outbound commitments a block's header makes.
    fn verify_outbound(&self, block: &ShardBlock) -> RelayResult<()>;

    /// Shard count used for routing.
    fn shard_count(&self) -> u8;
}

//! # Relay Service
//!
//! Binds the bundle algorithms to a shard count and a commitment source.

use crate::algorithms;
use crate::domain::{RelayError, RelayResult};
use crate::ports::{CommitmentSource, CrossShardRelayApi};
use sc_01_block_model::{CrossOutputCoin, OutputCoin, ShardBlock};
use shared_types::{hash_to_hex, Hash, ShardId};
use std::sync::Arc;
use tracing::warn;

/// Cross-shard relay service.
pub struct CrossShardRelay<S: CommitmentSource> {
    shard_count: u8,
    commitments: Arc<S>,
}

impl<S: CommitmentSource> CrossShardRelay<S> {
    /// Create a relay routing over `shard_count` shards.
    pub fn new(shard_count: u8, commitments: Arc<S>) -> Self {
        Self {
            shard_count: shard_count.max(1),
            commitments,
        }
    }
}

impl<S: CommitmentSource> CrossShardRelayApi for CrossShardRelay<S> {
    fn build_cross_shard_bundles(
        &self,
        produced_outputs: &[OutputCoin],
        current_shard: ShardId,
    ) -> Vec<CrossOutputCoin> {
        algorithms::build_cross_shard_bundles(produced_outputs, current_shard, self.shard_count)
    }

    fn verify_bundle(&self, bundle: &CrossOutputCoin, claimed_block_hash: &Hash) -> bool {
        match algorithms::verify_bundle(bundle, claimed_block_hash, self.shard_count) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    destination = bundle.shard_id,
                    claimed = %hash_to_hex(claimed_block_hash),
                    "[sc-02] Bundle rejected: {}", e
                );
                false
            }
        }
    }

    fn verify_inbound(&self, bundle: &CrossOutputCoin) -> RelayResult<()> {
        let commitment = self
            .commitments
            .ownership_commitment(&bundle.block_hash, bundle.shard_id)
            .ok_or(RelayError::UnknownSource {
                destination: bundle.shard_id,
            })?;

        algorithms::verify_bundle(bundle, &bundle.block_hash, self.shard_count)?;

        if bundle.ownership_hash() != commitment {
            warn!(
                destination = bundle.shard_id,
                source = %hash_to_hex(&bundle.block_hash),
                "[sc-02] Ownership hash mismatch"
            );
            return Err(RelayError::OwnershipMismatch {
                destination: bundle.shard_id,
            });
        }
        Ok(())
    }

    fn verify_outbound(&self, block: &ShardBlock) -> RelayResult<()> {
        algorithms::verify_outbound_commitments(block, self.shard_count)
    }

    fn shard_count(&self) -> u8 {
        self.shard_count
    }
}

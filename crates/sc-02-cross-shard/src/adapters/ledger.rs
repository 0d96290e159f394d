//! # Commitment Ledger
//!
//! Records the outbound bundles of finalized shard blocks and serves their
//! ownership hashes to destination shards. Also keeps the bundles queued per
//! destination until a destination block consumes them.

use crate::algorithms::outbound_bundles;
use crate::ports::CommitmentSource;
use parking_lot::RwLock;
use sc_01_block_model::{CrossOutputCoin, ShardBlock};
use shared_types::{Hash, ShardId};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

#[derive(Default)]
struct LedgerState {
    commitments: HashMap<(Hash, ShardId), Hash>,
    pending: BTreeMap<ShardId, Vec<CrossOutputCoin>>,
}

/// In-memory commitment ledger.
#[derive(Default)]
pub struct CommitmentLedger {
    state: RwLock<LedgerState>,
}

impl CommitmentLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outbound bundles of a finalized block and queue them for
    /// their destinations. Returns the tagged bundles.
    pub fn record_block(&self, block: &ShardBlock, shard_count: u8) -> Vec<CrossOutputCoin> {
        let bundles = outbound_bundles(&block.header, &block.body, shard_count);
        let block_hash = block.hash();
        let mut state = self.state.write();
        for bundle in &bundles {
            state
                .commitments
                .insert((block_hash, bundle.shard_id), bundle.ownership_hash());
            state
                .pending
                .entry(bundle.shard_id)
                .or_default()
                .push(bundle.clone());
        }
        debug!(
            source_shard = block.header.shard_id,
            height = block.header.height,
            bundles = bundles.len(),
            "[sc-02] Recorded outbound bundles"
        );
        bundles
    }

    /// Bundles waiting to be consumed by `destination`.
    pub fn pending_for(&self, destination: ShardId) -> Vec<CrossOutputCoin> {
        self.state
            .read()
            .pending
            .get(&destination)
            .cloned()
            .unwrap_or_default()
    }

    /// Drop queued bundles that a destination block has consumed.
    pub fn mark_consumed(&self, destination: ShardId, consumed: &[CrossOutputCoin]) {
        let mut state = self.state.write();
        if let Some(queue) = state.pending.get_mut(&destination) {
            queue.retain(|b| !consumed.contains(b));
        }
    }
}

impl CommitmentSource for CommitmentLedger {
    fn ownership_commitment(&self, source_block_hash: &Hash, destination: ShardId) -> Option<Hash> {
        self.state
            .read()
            .commitments
            .get(&(*source_block_hash, destination))
            .copied()
    }
}

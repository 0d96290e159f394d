//! # Beacon Blocks
//!
//! The beacon chain records, per shard, the best shard block it has seen.
//! Shards anchor to a beacon height; the beacon in turn commits to their
//! states through `shard_state_root`.

use super::encoding::Canonical;
use super::errors::BlockResult;
use super::invariants;
use super::shard_block::FinalityProof;
use crate::algorithms::{fold_merkle, merkle_root_instructions};
use serde::{Deserialize, Serialize};
use shared_types::{hash_to_hex, Hash, PublicKey, ShardId, ZERO_HASH};
use std::collections::BTreeMap;

/// Shard summary carried in a beacon body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardState {
    /// Best shard height seen.
    pub height: u64,
    /// Hash of that shard block.
    pub hash: Hash,
    /// Destinations that shard block sent bundles to.
    #[serde(default)]
    pub cross_shards: Vec<ShardId>,
}

impl ShardState {
    fn leaf(&self, shard_id: ShardId) -> Hash {
        let mut c = Canonical::new();
        c.u8(shard_id).u64(self.height).hash(&self.hash).bytes(&self.cross_shards);
        c.digest()
    }
}

/// Beacon block header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconHeader {
    /// Proposer key.
    pub producer: PublicKey,
    /// Format version.
    pub version: u32,
    /// Block height; genesis is 0.
    pub height: u64,
    /// Epoch number.
    pub epoch: u64,
    /// Unix seconds.
    pub timestamp: i64,
    /// Hash of the parent block.
    pub prev_block_hash: Hash,
    /// Root over the per-shard states in the body.
    pub shard_state_root: Hash,
    /// Root over the body's instructions.
    pub instruction_root: Hash,
}

impl BeaconHeader {
    /// Header with zeroed roots.
    pub fn new(producer: PublicKey, height: u64, prev_block_hash: Hash) -> Self {
        Self {
            producer,
            version: 1,
            height,
            epoch: 0,
            timestamp: 0,
            prev_block_hash,
            shard_state_root: ZERO_HASH,
            instruction_root: ZERO_HASH,
        }
    }

    /// Double hash over timestamp decimal, height decimal, previous hash hex
    /// and producer base58.
    pub fn hash(&self) -> Hash {
        let mut c = Canonical::new();
        c.decimal(self.timestamp)
            .decimal(self.height)
            .text(&hash_to_hex(&self.prev_block_hash))
            .text(&self.producer.to_base58());
        c.digest()
    }
}

/// Beacon block body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BeaconBody {
    /// Best state per shard, keyed by shard id.
    #[serde(default)]
    pub shard_states: BTreeMap<ShardId, ShardState>,
    /// Opaque protocol instructions.
    #[serde(default)]
    pub instructions: Vec<Vec<String>>,
}

impl BeaconBody {
    /// Merkle root over shard-state leaves in shard order.
    pub fn shard_state_root(&self) -> Hash {
        let leaves: Vec<Hash> = self
            .shard_states
            .iter()
            .map(|(id, state)| state.leaf(*id))
            .collect();
        fold_merkle(&leaves)
    }

    /// Fill a header's body-derived roots.
    pub fn seal(&self, header: &mut BeaconHeader) {
        header.shard_state_root = self.shard_state_root();
        header.instruction_root = merkle_root_instructions(&self.instructions);
    }
}

/// A sealed beacon block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconBlock {
    /// Header.
    pub header: BeaconHeader,
    /// Body.
    pub body: BeaconBody,
    /// Producer signature over the header hash.
    #[serde(default)]
    pub producer_sig: Vec<u8>,
    /// Committee proof for this block.
    #[serde(default)]
    pub proof: FinalityProof,
    /// Committee proof of the parent block.
    #[serde(default)]
    pub parent_proof: FinalityProof,
}

impl BeaconBlock {
    /// Block hash, the header hash.
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// Digest the committee signs: the block hash bound to height and both
    /// body roots.
    pub fn commitment(&self) -> Hash {
        let mut c = Canonical::new();
        c.hash(&self.hash())
            .u64(self.header.height)
            .hash(&self.header.shard_state_root)
            .hash(&self.header.instruction_root);
        c.digest()
    }

    /// Recompute the body roots and compare with the header.
    pub fn verify_roots(&self) -> BlockResult<()> {
        invariants::invariant_beacon_roots_match(&self.header, &self.body)
    }
}

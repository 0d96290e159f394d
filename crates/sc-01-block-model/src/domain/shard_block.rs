//! # Shard Blocks
//!
//! Header, body and sealed block of a shard chain.
//!
//! The header hash covers (timestamp, shard id, previous hash, producer)
//! only. Roots are bound to the body by [`ShardBlock::verify_roots`], which
//! every validator runs before voting.

use super::coins::CrossOutputCoin;
use super::encoding::Canonical;
use super::errors::{BlockError, BlockResult};
use super::invariants;
use super::transaction::{Transaction, KNOWN_TX_TYPES};
use serde::{Deserialize, Serialize};
use shared_types::{hash_to_hex, Hash, PublicKey, ShardId, ZERO_HASH};

/// Aggregated committee signature over a block commitment and the indices of the
/// committee members whose signatures it contains.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FinalityProof {
    /// Scheme-specific aggregate blob.
    pub aggregated_sig: Vec<u8>,
    /// Committee positions of the signers, ascending.
    pub validators_idx: Vec<usize>,
}

impl FinalityProof {
    /// Whether no signature has been attached.
    pub fn is_empty(&self) -> bool {
        self.aggregated_sig.is_empty() && self.validators_idx.is_empty()
    }
}

/// Shard block header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardHeader {
    /// Proposer key.
    pub producer: PublicKey,
    /// Shard this block extends.
    pub shard_id: ShardId,
    /// Format version.
    pub version: u32,
    /// Block height; genesis is 0.
    pub height: u64,
    /// Beacon epoch the block belongs to.
    pub epoch: u64,
    /// Unix seconds.
    pub timestamp: i64,
    /// Hash of the parent block.
    pub prev_block_hash: Hash,
    /// Treasury (salary fund) balance after this block.
    pub salary_fund: u64,
    /// Plain merkle root over transaction hashes.
    pub tx_root: Hash,
    /// Per-shard transaction root.
    pub shard_tx_root: Hash,
    /// Root of the bundles this block creates for other shards.
    pub cross_output_coin_root: Hash,
    /// Root over the body's instructions.
    pub actions_root: Hash,
    /// Root over the committee that signs this block.
    pub committee_root: Hash,
    /// Root over validators waiting to join.
    pub pending_validator_root: Hash,
    /// Destination shards receiving bundles from this block, ascending.
    pub cross_shards: Vec<ShardId>,
    /// Beacon height this block is anchored to.
    pub beacon_height: u64,
    /// Beacon block hash at `beacon_height`.
    pub beacon_hash: Hash,
}

impl ShardHeader {
    /// Header with zeroed roots, ready to be filled by the producer.
    pub fn new(shard_id: ShardId, producer: PublicKey, height: u64, prev_block_hash: Hash) -> Self {
        Self {
            producer,
            shard_id,
            version: 1,
            height,
            epoch: 0,
            timestamp: 0,
            prev_block_hash,
            salary_fund: 0,
            tx_root: ZERO_HASH,
            shard_tx_root: ZERO_HASH,
            cross_output_coin_root: ZERO_HASH,
            actions_root: ZERO_HASH,
            committee_root: ZERO_HASH,
            pending_validator_root: ZERO_HASH,
            cross_shards: Vec::new(),
            beacon_height: 0,
            beacon_hash: ZERO_HASH,
        }
    }

    /// Double hash over timestamp decimal, shard id byte, previous hash hex
    /// and producer base58, in that order.
    pub fn hash(&self) -> Hash {
        let mut c = Canonical::new();
        c.decimal(self.timestamp)
            .u8(self.shard_id)
            .text(&hash_to_hex(&self.prev_block_hash))
            .text(&self.producer.to_base58());
        c.digest()
    }
}

/// Shard block body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShardBody {
    /// Opaque protocol instructions.
    #[serde(default)]
    pub instructions: Vec<Vec<String>>,
    /// Inbound bundles consumed by this block.
    #[serde(default)]
    pub cross_output_coins: Vec<CrossOutputCoin>,
    /// Transactions in execution order.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl ShardBody {
    /// Double hash over each bundle's canonical bytes followed by each
    /// transaction hash, in list order.
    pub fn hash(&self) -> Hash {
        let mut c = Canonical::new();
        for bundle in &self.cross_output_coins {
            bundle.write_canonical(&mut c);
        }
        for tx in &self.transactions {
            c.hash(&tx.hash());
        }
        c.digest()
    }

    /// Decode a JSON body.
    ///
    /// Transaction tags are checked before typed decoding so an unknown kind
    /// is reported as such rather than as a generic parse failure.
    pub fn from_json(data: &str) -> BlockResult<Self> {
        let value: serde_json::Value =
            serde_json::from_str(data).map_err(|e| BlockError::MalformedBody(e.to_string()))?;

        if let Some(txs) = value.get("transactions").and_then(|v| v.as_array()) {
            for tx in txs {
                let tag = tx
                    .get("Type")
                    .and_then(|t| t.as_str())
                    .ok_or_else(|| BlockError::MalformedBody("transaction without Type".into()))?;
                if !KNOWN_TX_TYPES.contains(&tag) {
                    return Err(BlockError::UnknownTransactionType(tag.to_string()));
                }
            }
        }

        serde_json::from_value(value).map_err(|e| BlockError::MalformedBody(e.to_string()))
    }

    /// Encode as JSON.
    pub fn to_json(&self) -> BlockResult<String> {
        serde_json::to_string(self).map_err(|e| BlockError::MalformedBody(e.to_string()))
    }
}

/// A sealed shard block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardBlock {
    /// Header.
    pub header: ShardHeader,
    /// Body.
    pub body: ShardBody,
    /// Producer signature over the header hash.
    #[serde(default)]
    pub producer_sig: Vec<u8>,
    /// Committee proof for this block, attached at finalization.
    #[serde(default)]
    pub proof: FinalityProof,
    /// Committee proof of the parent block.
    #[serde(default)]
    pub parent_proof: FinalityProof,
}

impl ShardBlock {
    /// Block hash, the header hash.
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// Digest the committee signs: the block hash bound to the body hash and
    /// every header root, so a signed header cannot be paired with another
    /// body.
    pub fn commitment(&self) -> Hash {
        let mut c = Canonical::new();
        c.hash(&self.hash())
            .hash(&self.body.hash())
            .u64(self.header.height)
            .hash(&self.header.tx_root)
            .hash(&self.header.shard_tx_root)
            .hash(&self.header.cross_output_coin_root)
            .hash(&self.header.actions_root)
            .hash(&self.header.committee_root);
        c.digest()
    }

    /// Recompute the transaction and action roots and compare with the
    /// header. The cross-output-coin root is checked by the relay.
    pub fn verify_roots(&self, shard_count: u8) -> BlockResult<()> {
        invariants::invariant_shard_roots_match(&self.header, &self.body, shard_count)
    }
}

//! # Block
//!
//! A block of either chain, as handled by consensus.

use super::beacon_block::BeaconBlock;
use super::shard_block::{FinalityProof, ShardBlock};
use serde::{Deserialize, Serialize};
use shared_types::{Chain, Hash, PublicKey};

/// Beacon or shard block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Block {
    /// Beacon chain block.
    Beacon(BeaconBlock),
    /// Shard chain block.
    Shard(ShardBlock),
}

impl Block {
    /// Chain the block belongs to.
    pub fn chain(&self) -> Chain {
        match self {
            Block::Beacon(_) => Chain::Beacon,
            Block::Shard(b) => Chain::Shard(b.header.shard_id),
        }
    }

    /// Block hash.
    pub fn hash(&self) -> Hash {
        match self {
            Block::Beacon(b) => b.hash(),
            Block::Shard(b) => b.hash(),
        }
    }

    /// Digest signed by the committee.
    pub fn commitment(&self) -> Hash {
        match self {
            Block::Beacon(b) => b.commitment(),
            Block::Shard(b) => b.commitment(),
        }
    }

    /// Block height.
    pub fn height(&self) -> u64 {
        match self {
            Block::Beacon(b) => b.header.height,
            Block::Shard(b) => b.header.height,
        }
    }

    /// Epoch.
    pub fn epoch(&self) -> u64 {
        match self {
            Block::Beacon(b) => b.header.epoch,
            Block::Shard(b) => b.header.epoch,
        }
    }

    /// Parent hash.
    pub fn prev_block_hash(&self) -> Hash {
        match self {
            Block::Beacon(b) => b.header.prev_block_hash,
            Block::Shard(b) => b.header.prev_block_hash,
        }
    }

    /// Proposer key.
    pub fn producer(&self) -> &PublicKey {
        match self {
            Block::Beacon(b) => &b.header.producer,
            Block::Shard(b) => &b.header.producer,
        }
    }

    /// Producer signature.
    pub fn producer_sig(&self) -> &[u8] {
        match self {
            Block::Beacon(b) => &b.producer_sig,
            Block::Shard(b) => &b.producer_sig,
        }
    }

    /// Set the producer signature.
    pub fn set_producer_sig(&mut self, sig: Vec<u8>) {
        match self {
            Block::Beacon(b) => b.producer_sig = sig,
            Block::Shard(b) => b.producer_sig = sig,
        }
    }

    /// Committee proof of this block.
    pub fn proof(&self) -> &FinalityProof {
        match self {
            Block::Beacon(b) => &b.proof,
            Block::Shard(b) => &b.proof,
        }
    }

    /// Attach the committee proof.
    pub fn set_proof(&mut self, proof: FinalityProof) {
        match self {
            Block::Beacon(b) => b.proof = proof,
            Block::Shard(b) => b.proof = proof,
        }
    }

    /// Committee proof of the parent block carried by this block.
    pub fn parent_proof(&self) -> &FinalityProof {
        match self {
            Block::Beacon(b) => &b.parent_proof,
            Block::Shard(b) => &b.parent_proof,
        }
    }
}

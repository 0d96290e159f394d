//! # Output Coins
//!
//! Value outputs created by transactions, and the cross-shard bundles that
//! carry them to the shard where they will be spent.

use super::encoding::Canonical;
use serde::{Deserialize, Serialize};
use shared_types::{shard_for_last_byte, Hash, PublicKey, ShardId};

/// A value output owned by `public_key`.
///
/// Commitment openings live in the privacy subsystem; here a coin is only
/// the data every node hashes identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputCoin {
    /// Receiver key. Its last byte routes the coin to a shard.
    pub public_key: PublicKey,
    /// Coin value.
    pub value: u64,
    /// Serial number derivator.
    pub snd: Hash,
    /// Commitment randomness.
    pub randomness: Hash,
    /// Free-form memo.
    #[serde(default)]
    pub info: Vec<u8>,
}

impl OutputCoin {
    /// Plain coin with zeroed commitment material.
    pub fn new(public_key: PublicKey, value: u64) -> Self {
        Self {
            public_key,
            value,
            snd: [0u8; 32],
            randomness: [0u8; 32],
            info: Vec::new(),
        }
    }

    /// Shard that can spend this coin.
    pub fn receiver_shard(&self, shard_count: u8) -> ShardId {
        shard_for_last_byte(self.public_key.last_byte(), shard_count)
    }

    /// Canonical byte encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut c = Canonical::new();
        self.write_canonical(&mut c);
        c.as_bytes().to_vec()
    }

    pub(crate) fn write_canonical(&self, c: &mut Canonical) {
        c.bytes(self.public_key.as_bytes())
            .u64(self.value)
            .hash(&self.snd)
            .hash(&self.randomness)
            .bytes(&self.info);
    }
}

/// Settlement bundle one shard emits for another.
///
/// `shard_id` is the destination; `block_hash` is the source block that
/// created the coins. Once a bundle is included in a body it is immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossOutputCoin {
    /// Destination shard.
    pub shard_id: ShardId,
    /// Hash of the block that created the coins.
    pub block_hash: Hash,
    /// Coins, in creation order.
    pub output_coins: Vec<OutputCoin>,
}

impl CrossOutputCoin {
    /// Canonical bytes: destination byte, block hash, each coin.
    ///
    /// This is exactly the bundle's contribution to the body hash.
    pub(crate) fn write_canonical(&self, c: &mut Canonical) {
        c.u8(self.shard_id).hash(&self.block_hash);
        for coin in &self.output_coins {
            coin.write_canonical(c);
        }
    }

    /// Digest binding destination, source block and coins together.
    ///
    /// The destination compares this against the commitment the source block
    /// published; any change to the claimed block hash changes it.
    pub fn ownership_hash(&self) -> Hash {
        let mut c = Canonical::new();
        self.write_canonical(&mut c);
        c.digest()
    }

    /// Sum of coin values.
    pub fn total_value(&self) -> u64 {
        self.output_coins
            .iter()
            .fold(0u64, |acc, coin| acc.saturating_add(coin.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(last: u8, value: u64) -> OutputCoin {
        OutputCoin::new(PublicKey::from_bytes(vec![9, 9, last]), value)
    }

    #[test]
    fn test_receiver_shard_uses_last_byte() {
        assert_eq!(coin(6, 1).receiver_shard(4), 2);
        assert_eq!(coin(3, 1).receiver_shard(4), 3);
    }

    #[test]
    fn test_ownership_hash_binds_block_hash() {
        let a = CrossOutputCoin {
            shard_id: 1,
            block_hash: [1u8; 32],
            output_coins: vec![coin(1, 10)],
        };
        let mut b = a.clone();
        b.block_hash = [2u8; 32];
        assert_ne!(a.ownership_hash(), b.ownership_hash());
        assert_eq!(a.ownership_hash(), a.clone().ownership_hash());
    }

    #[test]
    fn test_total_value() {
        let bundle = CrossOutputCoin {
            shard_id: 0,
            block_hash: [0u8; 32],
            output_coins: vec![coin(0, 10), coin(4, 32)],
        };
        assert_eq!(bundle.total_value(), 42);
    }
}

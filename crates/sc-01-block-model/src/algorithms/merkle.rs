//! # Merkle Roots
//!
//! Binary merkle reduction with double-sha256 parents. An odd node at any
//! level is carried up unpaired, never duplicated.
//!
//! Per-shard roots pre-allocate one leaf slot per shard before grouping, so
//! a shard with no entries still contributes the empty-string leaf.

use crate::domain::{CrossOutputCoin, Transaction};
use shared_types::{double_hash, empty_leaf_hash, hash_pair, hash_to_hex, Hash, PublicKey};

/// Fold leaves into a root.
///
/// Empty input yields the empty-string leaf hash.
pub fn fold_merkle(leaves: &[Hash]) -> Hash {
    if leaves.is_empty() {
        return empty_leaf_hash();
    }

    let mut level: Vec<Hash> = leaves.to_vec();

    while level.len() > 1 {
        let mut next_level = Vec::with_capacity((level.len() + 1) / 2);

        for chunk in level.chunks(2) {
            match chunk {
                [left, right] => next_level.push(hash_pair(left, right)),
                [single] => next_level.push(*single),
                _ => {}
            }
        }

        level = next_level;
    }

    level[0]
}

/// Root of a tree whose every leaf is the empty-string hash.
///
/// This is the transaction root of a block with no transactions.
pub fn empty_transactions_root(shard_count: u8) -> Hash {
    let leaves = vec![empty_leaf_hash(); usize::from(shard_count.max(1))];
    fold_merkle(&leaves)
}

/// Per-shard transaction root.
///
/// Transactions are grouped by the shard their sender routes to. Each shard
/// leaf is the double hash of its transactions' hex hashes concatenated in
/// list order; shards without transactions get the empty-string leaf.
pub fn merkle_root_transactions(txs: &[Transaction], shard_count: u8) -> Hash {
    let count = shard_count.max(1);
    let mut per_shard: Vec<String> = vec![String::new(); usize::from(count)];

    for tx in txs {
        per_shard[usize::from(tx.shard_id(count))].push_str(&hash_to_hex(&tx.hash()));
    }

    let leaves: Vec<Hash> = per_shard.iter().map(|s| double_hash(s.as_bytes())).collect();
    fold_merkle(&leaves)
}

/// Per-destination bundle root.
///
/// Same shape as [`merkle_root_transactions`], keyed by bundle destination
/// and built from ownership hashes.
pub fn merkle_root_shard_bundles(bundles: &[CrossOutputCoin], shard_count: u8) -> Hash {
    let count = shard_count.max(1);
    let mut per_shard: Vec<String> = vec![String::new(); usize::from(count)];

    for bundle in bundles {
        let slot = usize::from(bundle.shard_id % count);
        per_shard[slot].push_str(&hash_to_hex(&bundle.ownership_hash()));
    }

    let leaves: Vec<Hash> = per_shard.iter().map(|s| double_hash(s.as_bytes())).collect();
    fold_merkle(&leaves)
}

/// Plain root over transaction hashes in list order.
pub fn merkle_root_tx_hashes(txs: &[Transaction]) -> Hash {
    let leaves: Vec<Hash> = txs.iter().map(Transaction::hash).collect();
    fold_merkle(&leaves)
}

/// Root over instruction tuples; each leaf hashes the concatenated strings.
pub fn merkle_root_instructions(instructions: &[Vec<String>]) -> Hash {
    let leaves: Vec<Hash> = instructions
        .iter()
        .map(|inst| double_hash(inst.concat().as_bytes()))
        .collect();
    fold_merkle(&leaves)
}

/// Root over an ordered key list, used for committee commitments.
pub fn merkle_root_keys(keys: &[PublicKey]) -> Hash {
    let leaves: Vec<Hash> = keys.iter().map(|k| double_hash(k.as_bytes())).collect();
    fold_merkle(&leaves)
}

//! # Domain Invariants
//!
//! A header is valid only if every root it carries equals the root
//! recomputed from its body. Mismatches are errors, never repaired.
//!
//! The cross-output-coin root depends on bundle construction and is checked
//! by the cross-shard relay.

use super::beacon_block::{BeaconBody, BeaconHeader};
use super::errors::{BlockError, BlockResult};
use super::shard_block::{ShardBody, ShardHeader};
use crate::algorithms::{
    merkle_root_instructions, merkle_root_transactions, merkle_root_tx_hashes,
};
use shared_types::Hash;

fn check(field: &'static str, expected: &Hash, actual: Hash) -> BlockResult<()> {
    if *expected != actual {
        return Err(BlockError::RootMismatch { field });
    }
    Ok(())
}

/// Invariant: shard header roots match the body.
pub fn invariant_shard_roots_match(
    header: &ShardHeader,
    body: &ShardBody,
    shard_count: u8,
) -> BlockResult<()> {
    if shard_count == 0 {
        return Err(BlockError::ZeroShardCount);
    }
    check("tx_root", &header.tx_root, merkle_root_tx_hashes(&body.transactions))?;
    check(
        "shard_tx_root",
        &header.shard_tx_root,
        merkle_root_transactions(&body.transactions, shard_count),
    )?;
    check(
        "actions_root",
        &header.actions_root,
        merkle_root_instructions(&body.instructions),
    )?;
    Ok(())
}

/// Invariant: beacon header roots match the body.
pub fn invariant_beacon_roots_match(header: &BeaconHeader, body: &BeaconBody) -> BlockResult<()> {
    check("shard_state_root", &header.shard_state_root, body.shard_state_root())?;
    check(
        "instruction_root",
        &header.instruction_root,
        merkle_root_instructions(&body.instructions),
    )?;
    Ok(())
}

/// Fill a shard header's body-derived roots.
pub fn seal_shard_roots(header: &mut ShardHeader, body: &ShardBody, shard_count: u8) {
    header.tx_root = merkle_root_tx_hashes(&body.transactions);
    header.shard_tx_root = merkle_root_transactions(&body.transactions, shard_count);
    header.actions_root = merkle_root_instructions(&body.instructions);
}

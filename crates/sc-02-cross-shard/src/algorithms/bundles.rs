//! # Cross-Shard Bundles
//!
//! A shard block creates coins for receivers on other shards. Those coins
//! leave in one bundle per destination, tagged with the creating block's
//! hash. The header commits to the bundles through `cross_output_coin_root`
//! and lists the destinations in `cross_shards`.
//!
//! The header hash does not cover either field, so the producer hashes the
//! header first, tags the bundles, and then fills the commitment.

use crate::domain::{RelayError, RelayResult};
use sc_01_block_model::{
    merkle_root_shard_bundles, CrossOutputCoin, OutputCoin, ShardBlock, ShardBody, ShardHeader,
};
use shared_types::{Hash, ShardId, ZERO_HASH};
use std::collections::BTreeMap;

/// Group outputs by destination shard.
///
/// Outputs staying on `current_shard` are not bundled. Bundles come out in
/// ascending destination order, coins in their original order, and carry a
/// zero block hash until [`tag_with_block_hash`] is applied.
pub fn build_cross_shard_bundles(
    produced_outputs: &[OutputCoin],
    current_shard: ShardId,
    shard_count: u8,
) -> Vec<CrossOutputCoin> {
    let mut groups: BTreeMap<ShardId, Vec<OutputCoin>> = BTreeMap::new();

    for coin in produced_outputs {
        let destination = coin.receiver_shard(shard_count);
        if destination == current_shard {
            continue;
        }
        groups.entry(destination).or_default().push(coin.clone());
    }

    groups
        .into_iter()
        .map(|(shard_id, output_coins)| CrossOutputCoin {
            shard_id,
            block_hash: ZERO_HASH,
            output_coins,
        })
        .collect()
}

/// Stamp the creating block's hash onto every bundle.
pub fn tag_with_block_hash(bundles: &mut [CrossOutputCoin], block_hash: Hash) {
    for bundle in bundles {
        bundle.block_hash = block_hash;
    }
}

/// Tagged outbound bundles of a block, derived from its transactions.
pub fn outbound_bundles(
    header: &ShardHeader,
    body: &ShardBody,
    shard_count: u8,
) -> Vec<CrossOutputCoin> {
    let outputs: Vec<OutputCoin> = body
        .transactions
        .iter()
        .flat_map(|tx| tx.outputs().iter().cloned())
        .collect();
    let mut bundles = build_cross_shard_bundles(&outputs, header.shard_id, shard_count);
    tag_with_block_hash(&mut bundles, header.hash());
    bundles
}

/// Destination list for the header's `cross_shards` field.
pub fn cross_shard_destinations(bundles: &[CrossOutputCoin]) -> Vec<ShardId> {
    let mut destinations: Vec<ShardId> = bundles.iter().map(|b| b.shard_id).collect();
    destinations.sort_unstable();
    destinations.dedup();
    destinations
}

/// Fill `cross_output_coin_root` and `cross_shards` from the body.
///
/// Call after every field covered by the header hash is final.
pub fn seal_outbound_commitments(header: &mut ShardHeader, body: &ShardBody, shard_count: u8) {
    let bundles = outbound_bundles(header, body, shard_count);
    header.cross_output_coin_root = merkle_root_shard_bundles(&bundles, shard_count);
    header.cross_shards = cross_shard_destinations(&bundles);
}

/// Recompute the outbound commitments of a block and compare.
pub fn verify_outbound_commitments(block: &ShardBlock, shard_count: u8) -> RelayResult<()> {
    let bundles = outbound_bundles(&block.header, &block.body, shard_count);
    if block.header.cross_output_coin_root != merkle_root_shard_bundles(&bundles, shard_count) {
        return Err(RelayError::OutboundMismatch {
            field: "cross_output_coin_root",
        });
    }
    if block.header.cross_shards != cross_shard_destinations(&bundles) {
        return Err(RelayError::OutboundMismatch {
            field: "cross_shards",
        });
    }
    Ok(())
}

/// Structural check of an inbound bundle against the source block hash the
/// verifier trusts.
///
/// The bundle's ownership hash is recomputed as if issued by
/// `claimed_block_hash`; any difference from the carried bundle is a
/// mismatch. Every coin must also route to the bundle's destination.
pub fn verify_bundle(
    bundle: &CrossOutputCoin,
    claimed_block_hash: &Hash,
    shard_count: u8,
) -> RelayResult<()> {
    let reissued = CrossOutputCoin {
        block_hash: *claimed_block_hash,
        ..bundle.clone()
    };
    if reissued.ownership_hash() != bundle.ownership_hash() {
        return Err(RelayError::BlockHashMismatch {
            claimed: *claimed_block_hash,
            carried: bundle.block_hash,
        });
    }
    if bundle.output_coins.is_empty() {
        return Err(RelayError::EmptyBundle(bundle.shard_id));
    }
    for coin in &bundle.output_coins {
        let coin_shard = coin.receiver_shard(shard_count);
        if coin_shard != bundle.shard_id {
            return Err(RelayError::MisroutedCoin {
                destination: bundle.shard_id,
                coin_shard,
            });
        }
    }
    Ok(())
}

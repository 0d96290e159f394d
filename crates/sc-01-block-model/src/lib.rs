//! # SC-01 Block Model
//!
//! Canonical block data model for the beacon and shard chains.
//!
//! **Subsystem ID:** 1  
//! **Architecture:** Hexagonal (DDD), pure domain with no ports
//!
//! ## Purpose
//!
//! Make blocks deterministically hashable and verifiable across shards:
//! - Header and body hashes as double SHA-256 over canonical bytes
//! - Per-shard transaction roots and per-destination bundle roots
//! - Header/body root invariants checked before any vote
//!
//! ## Canonical Hashing
//!
//! | Object | Digest input |
//! |--------|--------------|
//! | Shard header | timestamp decimal, shard byte, prev hash hex, producer base58 |
//! | Shard body | per bundle: shard byte, block hash, coins; per tx: tx hash |
//! | Bundle ownership | shard byte, block hash, coins |
//! | Transaction | kind tag, base fields, metadata hash, proof, token data |
//!
//! Serializers are never used for hashing; JSON is only the body transport
//! format.
//!
//! ## Module Structure
//!
//! ```text
//! sc-01-block-model/
//! ├── domain/          # Blocks, transactions, metadata, coins, invariants
//! └── algorithms/      # Merkle roots
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod domain;

// Re-exports
pub use algorithms::{
    empty_transactions_root, fold_merkle, merkle_root_instructions, merkle_root_keys,
    merkle_root_shard_bundles, merkle_root_transactions, merkle_root_tx_hashes,
};
pub use domain::{
    invariant_beacon_roots_match, invariant_shard_roots_match, seal_shard_roots, BeaconBlock,
    BeaconBody, BeaconHeader, Block, BlockError, BlockResult, Board, BuyBackRequest,
    BuyBackResponse, BuySellRequest, BuySellResponse, CrossOutputCoin, DividendPayout,
    FinalityProof, GovernanceAction, IssuingRequest, Metadata, MetadataType,
    MultiSigsRegistration, OracleBoardAction, OutputCoin, ShardBlock, ShardBody, ShardHeader,
    ShardState, TokenTx, Transaction, Tx, TxKind, TxTokenData, TxTokenVin, TxTokenVout,
    UpdatingOracleBoard, DCB_TOKEN_ID, GOV_TOKEN_ID, NATIVE_COIN_ID,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Hash a shard header.
pub fn hash_header(header: &ShardHeader) -> shared_types::Hash {
    header.hash()
}

/// Hash a shard body.
pub fn hash_body(body: &ShardBody) -> shared_types::Hash {
    body.hash()
}

//! # SC-02 Cross-Shard Relay
//!
//! Settlement bundles between shards.
//!
//! **Subsystem ID:** 2  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! A shard block that pays receivers on other shards emits one
//! [`CrossOutputCoin`](sc_01_block_model::CrossOutputCoin) bundle per
//! destination:
//! - Outputs are routed by the receiver key's last byte
//! - Bundles are tagged with the creating block's hash
//! - The creating header commits to them via `cross_output_coin_root`
//!
//! The destination accepts a bundle only if its recomputed ownership hash
//! equals the commitment recorded for the source block.
//!
//! ## Module Structure
//!
//! ```text
//! sc-02-cross-shard/
//! ├── domain/          # RelayError
//! ├── algorithms/      # Bundle build, tag, seal, verify
//! ├── ports/           # CrossShardRelayApi, CommitmentSource
//! ├── adapters/        # CommitmentLedger
//! └── service.rs       # CrossShardRelay
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::CommitmentLedger;
pub use algorithms::{
    build_cross_shard_bundles, cross_shard_destinations, outbound_bundles,
    seal_outbound_commitments, tag_with_block_hash, verify_bundle, verify_outbound_commitments,
};
pub use domain::{RelayError, RelayResult};
pub use ports::{CommitmentSource, CrossShardRelayApi};
pub use service::CrossShardRelay;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

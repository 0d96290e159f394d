//! # Shard-Chain Test Suite
//!
//! Unified test crate for flows that span several subsystems.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── cross_shard_flow.rs   # Template → relay → ledger → destination shard
//! │   └── consensus_network.rs  # Committees of engines over a loopback network
//! └── benches/
//!     └── subsystem_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p sc-tests
//!
//! # By flow
//! cargo test -p sc-tests integration::cross_shard_flow
//! cargo test -p sc-tests integration::consensus_network
//!
//! # Benchmarks
//! cargo bench -p sc-tests
//! ```

pub mod integration;

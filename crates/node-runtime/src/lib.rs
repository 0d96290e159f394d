//! # Node Runtime Library
//!
//! Configuration and devnet wiring for the shard-chain node. The binary in
//! `main.rs` is a thin shell over these modules.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, then `SC_*` environment overrides)
//! 2. Initialize logging
//! 3. Build the shared chain, the committees and one engine per member
//! 4. Start the engines and the transaction feeder
//! 5. Wait for Ctrl+C, then stop everything

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod devnet;

pub use config::{load_config, load_config_from, ConfigError, DevnetConfig, NodeConfig};
pub use devnet::{synthetic_transaction, Devnet, TracingStatus};

//! # Integration Tests
//!
//! Cross-subsystem flows, driven through the public crate APIs only.

pub mod consensus_network;
pub mod cross_shard_flow;

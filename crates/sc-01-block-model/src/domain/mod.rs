//! # Domain Module
//!
//! Block, body, transaction and coin types with their canonical hashes.

pub mod beacon_block;
pub mod block;
pub mod coins;
pub mod encoding;
pub mod errors;
pub mod invariants;
pub mod metadata;
pub mod shard_block;
pub mod transaction;

pub use beacon_block::*;
pub use block::*;
pub use coins::*;
pub use errors::*;
pub use invariants::*;
pub use metadata::*;
pub use shard_block::*;
pub use transaction::*;

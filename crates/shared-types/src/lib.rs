//! # Shared Types Crate
//!
//! Primitive types used by every Shard-Chain subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: hashes, chain identifiers and validator keys
//!   are defined once here.
//! - **Canonical Hashing**: every digest in the system is a double sha256
//!   over explicitly concatenated bytes, never over a serializer's output.
//! - **Opaque Storage**: persistence is reached only through the
//!   [`KeyValueStore`] trait.

#![warn(missing_docs)]

pub mod entities;
pub mod errors;
pub mod hashing;
pub mod storage;

pub use entities::*;
pub use errors::*;
pub use hashing::*;
pub use storage::{InMemoryStore, KeyValueStore};

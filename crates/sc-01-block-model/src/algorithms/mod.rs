//! # Algorithms
//!
//! Merkle-root computation over transactions, bundles and instructions.

pub mod merkle;

pub use merkle::*;

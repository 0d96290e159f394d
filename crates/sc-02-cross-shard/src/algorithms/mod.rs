//! # Algorithms
//!
//! Bundle construction and verification.

pub mod bundles;

pub use bundles::*;

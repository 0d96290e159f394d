//! # Domain Module
//!
//! Relay errors.

pub mod errors;

pub use errors::*;

//! # Ports
//!
//! Inbound API and the outbound commitment lookup.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;

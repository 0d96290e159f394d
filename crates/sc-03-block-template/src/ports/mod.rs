//! # Ports
//!
//! Inbound API and the collaborators the generator depends on.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;

//! Domain layer for the consensus engine
//!
//! Committees, roles, quorum rules, wire messages and round state.

pub mod committee;
pub mod errors;
pub mod messages;
pub mod quorum;
pub mod role;
pub mod round_state;

pub use committee::*;
pub use errors::*;
pub use messages::*;
pub use quorum::*;
pub use role::*;
pub use round_state::*;

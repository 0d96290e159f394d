//! # Adapters
//!
//! In-process implementation of the commitment port.

pub mod ledger;

pub use ledger::CommitmentLedger;

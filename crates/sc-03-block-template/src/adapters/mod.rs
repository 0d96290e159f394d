//! Adapters for the generator's outbound ports.

pub mod dividend;
pub mod verifiers;

pub use dividend::DividendBuilder;
pub use verifiers::{MempoolMetadataValidator, StructuralTxVerifier};

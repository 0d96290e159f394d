//! Error types for block template generation

use shared_types::ShardId;
use thiserror::Error;

/// Result type alias for template operations
pub type TemplateResult<T> = std::result::Result<T, TemplateError>;

/// Errors that abort a template build.
///
/// Per-transaction admission failures are never reported here; they route
/// the transaction to the reject group instead.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The chain has no best block for the shard, so no height can be derived
    #[error("No best block for shard {0}")]
    NoBestBlock(ShardId),

    /// A treasury sub-builder failed
    #[error("Sub-builder {builder} failed: {source}")]
    SubBuilder {
        /// Which sub-builder
        builder: &'static str,
        /// Underlying failure
        #[source]
        source: SubBuildError,
    },
}

/// Failure reported by a treasury sub-builder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubBuildError {
    /// Token holder data could not be read
    #[error("Holder lookup failed: {0}")]
    HolderLookup(String),

    /// Total supply of the paid token is zero while holders exist
    #[error("Token has holders but zero supply")]
    ZeroSupply,

    /// Any other builder-specific failure
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_builder_message() {
        let err = TemplateError::SubBuilder {
            builder: "bank_dividend",
            source: SubBuildError::ZeroSupply,
        };
        assert_eq!(
            err.to_string(),
            "Sub-builder bank_dividend failed: Token has holders but zero supply"
        );
    }
}

//! # Domain Errors
//!
//! Malformed-block errors. A block or transaction raising one of these is
//! rejected; nothing is coerced into a valid shape.

use thiserror::Error;

/// Block model error types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BlockError {
    /// Body payload could not be parsed.
    #[error("Malformed block body: {0}")]
    MalformedBody(String),

    /// A transaction carried a type tag outside the known set.
    #[error("Unknown transaction type: {0}")]
    UnknownTransactionType(String),

    /// A header root does not match the root recomputed from the body.
    #[error("Root mismatch in header field {field}")]
    RootMismatch {
        /// Header field that disagrees with the body
        field: &'static str,
    },

    /// Shard count of zero was supplied where routing is required.
    #[error("Shard count must be at least 1")]
    ZeroShardCount,
}

/// Result type for block model operations.
pub type BlockResult<T> = Result<T, BlockError>;

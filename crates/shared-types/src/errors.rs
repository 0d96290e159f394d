//! # Error Types
//!
//! Defines error types used across subsystems.

use thiserror::Error;

/// Errors raised by the key-value storage interface.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// Key not present.
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Backend failure.
    #[error("Database error: {0}")]
    DatabaseError(String),
}

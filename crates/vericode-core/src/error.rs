//! Error types for Vericode Core.

use thiserror::Error;

/// Errors from code generation and hashing.
#[derive(Debug, Error)]
pub enum CodeError {
    /// A caller supplied an argument outside its valid domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The hashing primitive failed. Not retried.
    #[error("hashing error: {0}")]
    Hashing(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CodeError>;

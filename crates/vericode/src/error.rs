//! Error types for the unified API.

use thiserror::Error;
use vericode_core::CodeError;
use vericode_store::StoreError;

/// Errors from a delivery channel.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The channel refused this message or recipient.
    #[error("delivery rejected: {0}")]
    Rejected(String),

    /// The channel could not be reached.
    #[error("delivery channel unavailable: {0}")]
    Unavailable(String),
}

/// Invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors that can occur during challenge operations.
#[derive(Debug, Error)]
pub enum ChallengeError {
    /// Code generation or hashing failed.
    #[error("code error: {0}")]
    Code(#[from] CodeError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The code could not be handed to the delivery channel.
    #[error("delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A blocking hash task panicked or was cancelled.
    #[error("hashing task failed: {0}")]
    TaskFailed(String),
}

/// Result type for challenge operations.
pub type Result<T> = std::result::Result<T, ChallengeError>;

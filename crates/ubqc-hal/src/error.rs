//! Error types for the HAL crate.

use thiserror::Error;

/// Errors raised by quantum backends and classical channels.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// The quantum backend failed an operation.
    #[error("Backend error: {0}")]
    Backend(String),

    /// The backend cannot perform the requested operation.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// The peer hung up.
    #[error("Channel closed")]
    ChannelClosed,

    /// Generic transport failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Message encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;

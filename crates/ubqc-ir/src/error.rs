//! Error types for the IR crate.

use thiserror::Error;

/// Errors that can occur while building or parsing patterns.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Gate name not recognised.
    #[error("Unknown gate '{0}'")]
    UnknownGate(String),

    /// Pattern text could not be parsed.
    #[error("Pattern parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;

//! Error types for the compile crate.

use thiserror::Error;

/// Errors detected while compiling a pattern into a flow.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// The pattern is structurally invalid.
    #[error("Malformed flow: {0}")]
    MalformedFlow(String),

    /// The pattern needs more qubits than the compiler was configured for.
    #[error("Pattern requires {required} qubits, limit is {limit}")]
    QubitLimitExceeded {
        /// Qubits the pattern uses.
        required: u32,
        /// Configured limit.
        limit: u32,
    },
}

impl CompileError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        CompileError::MalformedFlow(message.into())
    }
}

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;

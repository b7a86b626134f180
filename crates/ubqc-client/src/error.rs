//! Error types for the client crate.

use std::time::Duration;

use thiserror::Error;

use ubqc_compile::CompileError;
use ubqc_hal::HalError;

use crate::orchestrator::RunPhase;

/// Errors that abort a blind-computation run.
///
/// Failures are fatal: the run is consumed and no partial result is returned.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The pattern could not be compiled into a flow.
    #[error(transparent)]
    MalformedFlow(#[from] CompileError),

    /// The server sent something the protocol does not allow, or the run's
    /// own bookkeeping was used out of order.
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// Output qubits could not be matched to their logical indices.
    #[error("Index reconciliation failed: {0}")]
    IndexReconciliation(String),

    /// No reply arrived within the configured receive timeout.
    #[error("Timed out after {0:?} waiting for the server")]
    TimedOut(Duration),

    /// Backend or channel failure.
    #[error("HAL error: {0}")]
    Hal(#[from] HalError),

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An error annotated with the phase it occurred in.
    #[error("{phase} phase failed: {source}")]
    Phase {
        /// Phase the run was in.
        phase: RunPhase,
        /// Underlying error.
        source: Box<ClientError>,
    },
}

impl ClientError {
    pub(crate) fn violation(message: impl Into<String>) -> Self {
        ClientError::ProtocolViolation(message.into())
    }

    pub(crate) fn reconciliation(message: impl Into<String>) -> Self {
        ClientError::IndexReconciliation(message.into())
    }

    /// The phase this error was raised in, if recorded.
    pub fn phase(&self) -> Option<RunPhase> {
        match self {
            ClientError::Phase { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// The innermost error, with phase annotations stripped.
    pub fn root(&self) -> &ClientError {
        match self {
            ClientError::Phase { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_wrapper() {
        let err = ClientError::Phase {
            phase: RunPhase::MeasureLoop,
            source: Box::new(ClientError::violation("bit 7")),
        };
        assert_eq!(err.phase(), Some(RunPhase::MeasureLoop));
        assert!(matches!(err.root(), ClientError::ProtocolViolation(_)));
        assert_eq!(
            err.to_string(),
            "MeasureLoop phase failed: Protocol violation: bit 7"
        );
    }

    #[test]
    fn test_hal_conversion() {
        let err: ClientError = HalError::ChannelClosed.into();
        assert!(matches!(err, ClientError::Hal(HalError::ChannelClosed)));
        assert_eq!(err.phase(), None);
    }
}

//! Error types for the capture pipeline

use std::net::SocketAddr;

use thiserror::Error;

/// Core capture errors
#[derive(Error, Debug)]
pub enum SidekickError {
    // Wire errors
    #[error("Odd payload length: {0} bytes")]
    OddLength(usize),

    #[error("Unrecognized payload length: {0} bytes")]
    UnrecognizedLength(usize),

    // Transport errors
    #[error("Failed to bind {addr}: {reason}")]
    BindFailed { addr: SocketAddr, reason: String },

    #[error("Transport error: {0}")]
    TransportError(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Telemetry setup failed: {0}")]
    Telemetry(String),
}

impl SidekickError {
    /// Malformed payloads are dropped at the decode boundary and never
    /// reach the rig.
    pub fn is_malformed_payload(&self) -> bool {
        matches!(
            self,
            SidekickError::OddLength(_) | SidekickError::UnrecognizedLength(_)
        )
    }
}

/// Result type for capture operations
pub type SidekickResult<T> = Result<T, SidekickError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_classification() {
        assert!(SidekickError::OddLength(51).is_malformed_payload());
        assert!(SidekickError::UnrecognizedLength(50).is_malformed_payload());
        assert!(!SidekickError::TransportError("closed".into()).is_malformed_payload());
    }

    #[test]
    fn test_error_display() {
        let err = SidekickError::UnrecognizedLength(200);
        assert_eq!(err.to_string(), "Unrecognized payload length: 200 bytes");
    }
}

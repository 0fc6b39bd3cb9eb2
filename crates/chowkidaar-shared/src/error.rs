use thiserror::Error;

/// Errors raised while validating data received from the assistant API.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Unknown severity: {0}")]
    UnknownSeverity(String),

    #[error("Unknown message role: {0}")]
    UnknownRole(String),

    #[error("Invalid session id: {0}")]
    InvalidSessionId(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

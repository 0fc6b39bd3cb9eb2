use chowkidaar_shared::ProtocolError;
use thiserror::Error;

/// Errors produced by the assistant API layer.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Connection, TLS or body transfer failure.
    #[error("HTTP transport error: {0}")]
    Transport(reqwest::Error),

    /// The configured request timeout elapsed.
    #[error("Request timed out")]
    Timeout,

    /// The server answered with a non-success status.
    #[error("Server responded {status}: {detail}")]
    Status { status: u16, detail: String },

    /// The body did not match the expected schema.
    #[error("Invalid response: {0}")]
    Protocol(#[from] ProtocolError),

    /// A URL could not be built from the configured base.
    #[error("Invalid URL: {0}")]
    Url(String),

    /// The service cannot be reached at all (offline, not configured).
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Transport(e)
        }
    }
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;

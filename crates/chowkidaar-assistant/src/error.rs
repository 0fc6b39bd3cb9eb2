use thiserror::Error;

use chowkidaar_net::ApiError;

/// Errors surfaced by the assistant core.
///
/// Every variant is recoverable: the caller shows a notice and carries on.
#[derive(Error, Debug)]
pub enum AssistantError {
    /// The assistant service call failed.
    #[error("Assistant service error: {0}")]
    Api(#[from] ApiError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AssistantError>;

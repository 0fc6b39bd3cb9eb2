// HTTP access to the Chowkidaar assistant API.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod media;
pub mod service;

pub use auth::{token_provider_from_config, StaticToken, TokenFile, TokenProvider};
pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use http::HttpAssistantService;
pub use media::{ImageKind, MediaUrls};
pub use service::AssistantService;

//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the client can start with zero
//! configuration against a local backend.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chowkidaar_shared::constants::{
    DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SESSION_PAGE_SIZE,
};

/// Client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// Root of the versioned API, without trailing slash.
    /// Env: `CHOWKIDAAR_API_URL`
    /// Default: `http://localhost:8000/api/v1`
    pub api_url: String,

    /// Access token supplied directly.
    /// Env: `CHOWKIDAAR_TOKEN`
    /// Default: none.
    pub token: Option<String>,

    /// File holding the persisted access token (plain token or the JSON
    /// login response). Re-read on every request.
    /// Env: `CHOWKIDAAR_TOKEN_FILE`
    /// Default: none.
    pub token_file: Option<PathBuf>,

    /// Upper bound for a single request. `None` waits indefinitely.
    /// Env: `CHOWKIDAAR_REQUEST_TIMEOUT_SECS` (`0` disables)
    /// Default: 120 seconds.
    pub request_timeout: Option<Duration>,

    /// Number of sessions fetched per registry refresh.
    /// Env: `CHOWKIDAAR_SESSION_PAGE_SIZE`
    /// Default: `20`
    pub session_page_size: u32,

    /// Whether chat requests ask the server to ground replies in recent
    /// security events.
    /// Env: `CHOWKIDAAR_INCLUDE_EVENTS_CONTEXT` (true/false)
    /// Default: `true`
    pub include_events_context: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            token_file: None,
            request_timeout: Some(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
            session_page_size: DEFAULT_SESSION_PAGE_SIZE,
            include_events_context: true,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("token_file", &self.token_file)
            .field("request_timeout", &self.request_timeout)
            .field("session_page_size", &self.session_page_size)
            .field("include_events_context", &self.include_events_context)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("CHOWKIDAAR_API_URL") {
            match normalize_api_url(&url) {
                Ok(url) => config.api_url = url,
                Err(e) => {
                    tracing::warn!(
                        value = %url,
                        error = %e,
                        "Invalid CHOWKIDAAR_API_URL, using default"
                    );
                }
            }
        }

        if let Some(token) = lookup("CHOWKIDAAR_TOKEN") {
            let token = token.trim();
            if !token.is_empty() {
                config.token = Some(token.to_string());
            }
        }

        if let Some(path) = lookup("CHOWKIDAAR_TOKEN_FILE") {
            if !path.trim().is_empty() {
                config.token_file = Some(PathBuf::from(path.trim()));
            }
        }

        if let Some(val) = lookup("CHOWKIDAAR_REQUEST_TIMEOUT_SECS") {
            match val.trim().parse::<u64>() {
                Ok(0) => config.request_timeout = None,
                Ok(secs) => config.request_timeout = Some(Duration::from_secs(secs)),
                Err(_) => {
                    tracing::warn!(
                        value = %val,
                        "Invalid CHOWKIDAAR_REQUEST_TIMEOUT_SECS, using default"
                    );
                }
            }
        }

        if let Some(val) = lookup("CHOWKIDAAR_SESSION_PAGE_SIZE") {
            match val.trim().parse::<u32>() {
                Ok(n) if n > 0 => config.session_page_size = n,
                _ => {
                    tracing::warn!(
                        value = %val,
                        "Invalid CHOWKIDAAR_SESSION_PAGE_SIZE, using default"
                    );
                }
            }
        }

        if let Some(val) = lookup("CHOWKIDAAR_INCLUDE_EVENTS_CONTEXT") {
            config.include_events_context = val != "false" && val != "0";
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter.

        config
    }
}

/// Validate an API root and strip any trailing slash.
fn normalize_api_url(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = reqwest::Url::parse(trimmed).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(format!("unsupported scheme: {other}")),
    }
}

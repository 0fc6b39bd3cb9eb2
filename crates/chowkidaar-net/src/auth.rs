//! Read-only access to the ambient authentication token.
//!
//! Issuing and renewing credentials belongs to the auth collaborator. The
//! client only reads whatever token is currently persisted and attaches it
//! to outgoing requests and evidence image URLs.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::config::ClientConfig;

pub trait TokenProvider: Send + Sync + fmt::Debug {
    /// The current access token, if one is available.
    fn access_token(&self) -> Option<String>;
}

/// A token fixed for the lifetime of the process (or none at all).
#[derive(Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = self.0.as_ref().map(|_| "<redacted>");
        f.debug_tuple("StaticToken").field(&shown).finish()
    }
}

impl TokenProvider for StaticToken {
    fn access_token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// A token persisted on disk by the auth collaborator.
///
/// The file is read on every call so that renewals are picked up without
/// restarting. It may hold the bare token or the JSON login response
/// (`{"access_token": "...", "token_type": "bearer", ...}`).
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenProvider for TokenFile {
    fn access_token(&self) -> Option<String> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Token file unreadable");
                return None;
            }
        };
        parse_token(&raw)
    }
}

fn parse_token(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.starts_with('{') {
        let value: serde_json::Value = serde_json::from_str(raw).ok()?;
        return value
            .get("access_token")
            .and_then(serde_json::Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
    }
    (!raw.is_empty()).then(|| raw.to_string())
}

/// Pick the token source described by the configuration: an explicit token
/// wins over a token file; with neither, requests go out unauthenticated.
pub fn token_provider_from_config(config: &ClientConfig) -> Arc<dyn TokenProvider> {
    if let Some(ref token) = config.token {
        return Arc::new(StaticToken::new(token.clone()));
    }
    if let Some(ref path) = config.token_file {
        return Arc::new(TokenFile::new(path.clone()));
    }
    Arc::new(StaticToken::anonymous())
}

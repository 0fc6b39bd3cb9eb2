//! `reqwest` implementation of [`AssistantService`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use chowkidaar_shared::protocol::{RawChatReply, RawSession, RawSuggestions};
use chowkidaar_shared::{
    ChatReply, ChatRequest, ProtocolError, SessionDetail, SessionId, SessionSummary,
};

use crate::auth::TokenProvider;
use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::service::AssistantService;

/// Longest slice of an unstructured error body kept in [`ApiError::Status`].
const MAX_ERROR_DETAIL: usize = 200;

pub struct HttpAssistantService {
    http: reqwest::Client,
    api_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl HttpAssistantService {
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("chowkidaar-client/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.api_url, path));
        match self.tokens.access_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.text().await?;

        if !status.is_success() {
            let error = ApiError::Status {
                status: status.as_u16(),
                detail: error_detail(&body),
            };
            if error.is_unauthorized() {
                warn!(path = %url, error = %error, "Access token rejected, check CHOWKIDAAR_TOKEN or CHOWKIDAAR_TOKEN_FILE");
            } else {
                warn!(path = %url, error = %error, "Assistant API error");
            }
            return Err(error);
        }

        debug!(status = status.as_u16(), path = %url, bytes = body.len(), "Assistant API response");
        serde_json::from_str(&body).map_err(|e| ApiError::Protocol(ProtocolError::from(e)))
    }
}

#[async_trait]
impl AssistantService for HttpAssistantService {
    async fn list_sessions(&self, limit: u32) -> Result<Vec<SessionSummary>> {
        let raw: Vec<RawSession> = self
            .execute(
                self.request(Method::GET, "/assistant/sessions")
                    .query(&[("skip", 0), ("limit", limit)]),
            )
            .await?;

        let sessions = raw
            .iter()
            .map(RawSession::validate_summary)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(count = sessions.len(), "Listed sessions");
        Ok(sessions)
    }

    async fn get_session_detail(&self, id: SessionId) -> Result<SessionDetail> {
        let raw: RawSession = self
            .execute(self.request(Method::GET, &format!("/assistant/sessions/{id}")))
            .await?;

        let received = raw.messages.as_ref().map_or(0, Vec::len);
        let detail = raw.validate_detail()?;
        if detail.messages.len() < received {
            debug!(
                session = %id,
                skipped = received - detail.messages.len(),
                "Skipped history rows with unsupported roles"
            );
        }
        Ok(detail)
    }

    async fn send_message(&self, request: &ChatRequest) -> Result<ChatReply> {
        debug!(
            session = ?request.session_id,
            chars = request.message.chars().count(),
            "Sending chat message"
        );
        let raw: RawChatReply = self
            .execute(self.request(Method::POST, "/assistant/chat").json(request))
            .await?;
        let reply = raw.validate()?;
        if reply.dropped_events > 0 {
            warn!(dropped = reply.dropped_events, "Left out invalid evidence records");
        }
        Ok(reply)
    }

    async fn delete_session(&self, id: SessionId) -> Result<()> {
        let _: serde_json::Value = self
            .execute(self.request(Method::DELETE, &format!("/assistant/sessions/{id}")))
            .await?;
        Ok(())
    }

    async fn get_suggestions(&self) -> Result<Vec<String>> {
        let raw: RawSuggestions = self
            .execute(self.request(Method::GET, "/assistant/suggestions"))
            .await?;
        Ok(raw.suggestions)
    }
}

/// Extract a readable message from an error body.
///
/// The API answers errors with `{"detail": "..."}`; validation failures carry
/// a list under `detail` instead, which is kept as JSON text.
fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        match value.get("detail") {
            Some(serde_json::Value::String(s)) => return s.clone(),
            Some(other) => return other.to_string(),
            None => {}
        }
    }

    let body = body.trim();
    if body.is_empty() {
        return "no detail".to_string();
    }
    body.chars().take(MAX_ERROR_DETAIL).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_detail_string() {
        assert_eq!(error_detail(r#"{"detail":"Session not found"}"#), "Session not found");
    }

    #[test]
    fn test_error_detail_structured() {
        let detail = error_detail(r#"{"detail":[{"loc":["body","message"]}]}"#);
        assert!(detail.starts_with('['));
    }

    #[test]
    fn test_error_detail_plain_text() {
        assert_eq!(error_detail(""), "no detail");
        assert_eq!(error_detail("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_detail(&"x".repeat(500)).len(), MAX_ERROR_DETAIL);
    }
}

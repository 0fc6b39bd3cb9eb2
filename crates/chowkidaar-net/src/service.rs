//! The assistant service boundary.
//!
//! Everything above this trait (registry, cache, dispatcher) talks to the
//! backend exclusively through it, which keeps the state machine testable
//! against scripted doubles.

use async_trait::async_trait;

use chowkidaar_shared::{ChatReply, ChatRequest, SessionDetail, SessionId, SessionSummary};

use crate::error::Result;

#[async_trait]
pub trait AssistantService: Send + Sync {
    /// Most recently active sessions first, at most `limit` of them.
    async fn list_sessions(&self, limit: u32) -> Result<Vec<SessionSummary>>;

    /// Full ordered history of one session.
    async fn get_session_detail(&self, id: SessionId) -> Result<SessionDetail>;

    /// Send a user message and wait for the assistant's reply.
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatReply>;

    async fn delete_session(&self, id: SessionId) -> Result<()>;

    /// Example prompts for the empty state.
    async fn get_suggestions(&self) -> Result<Vec<String>>;
}

//! Assistant API schemas.
//!
//! `Raw*` types mirror the JSON the server sends and are deliberately loose
//! (optional lists, nullable fields, string enums). Each exposes a
//! `validate` step producing the strict domain type the rest of the client
//! works with; nothing downstream reads raw JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{FALLBACK_SESSION_TITLE, UNKNOWN_CAMERA};
use crate::error::ProtocolError;
use crate::timestamp;
use crate::types::{EventId, Role, SessionId, Severity};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `POST /assistant/chat`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    /// Absent for a draft conversation; the server then creates a session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    /// Ask the server to ground the reply in recent security events.
    pub include_events_context: bool,
}

// ---------------------------------------------------------------------------
// Chat reply
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RawChatReply {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<i64>,
    #[serde(default)]
    pub related_events: Option<Vec<i64>>,
    #[serde(default)]
    pub events_with_images: Option<Vec<RawRelatedEvent>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRelatedEvent {
    pub id: i64,
    pub event_type: String,
    pub severity: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub frame_path: Option<String>,
    #[serde(default)]
    pub thumbnail_path: Option<String>,
    #[serde(default)]
    pub camera_name: Option<String>,
    #[serde(default)]
    pub detected_objects: Option<Vec<Value>>,
}

/// A validated reply to a chat request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub text: String,
    /// Session the exchange was stored under, when the server reports one.
    pub session_id: Option<SessionId>,
    /// Ids of every event the server used as context.
    pub related_event_ids: Vec<EventId>,
    /// Renderable evidence, unbounded and in server order. `None` when the
    /// server attached none.
    pub related_events: Option<Vec<EvidenceRef>>,
    /// Evidence records left out because they failed validation.
    pub dropped_events: usize,
}

impl RawChatReply {
    /// Evidence is secondary to the reply: an invalid record is left out,
    /// never fails the reply.
    pub fn validate(self) -> Result<ChatReply, ProtocolError> {
        let raw_events = self.events_with_images.unwrap_or_default();
        let received = raw_events.len();
        let valid: Vec<EvidenceRef> = raw_events
            .into_iter()
            .filter_map(|raw| raw.validate().ok())
            .collect();
        let dropped_events = received - valid.len();
        let related_events = (!valid.is_empty()).then_some(valid);

        Ok(ChatReply {
            text: self.message,
            session_id: self.session_id.and_then(SessionId::from_wire),
            related_event_ids: self
                .related_events
                .unwrap_or_default()
                .into_iter()
                .map(EventId)
                .collect(),
            related_events,
            dropped_events,
        })
    }
}

// ---------------------------------------------------------------------------
// Evidence
// ---------------------------------------------------------------------------

/// Opaque server reference to a stored frame. Not the image bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FrameRef(pub String);

impl FrameRef {
    fn from_wire(raw: Option<String>) -> Option<Self> {
        raw.filter(|s| !s.trim().is_empty()).map(Self)
    }
}

/// Summary of a security event, renderable without further requests
/// (apart from the optional image).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EvidenceRef {
    pub id: EventId,
    pub camera_name: String,
    pub event_type: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    pub summary: Option<String>,
    pub frame: Option<FrameRef>,
    pub thumbnail: Option<FrameRef>,
    /// Labels of the detected objects (`class_name` of each detection).
    pub detected_objects: Vec<String>,
}

impl RawRelatedEvent {
    pub fn validate(self) -> Result<EvidenceRef, ProtocolError> {
        let detected_objects = self
            .detected_objects
            .unwrap_or_default()
            .iter()
            .filter_map(|obj| {
                obj.get("class_name")
                    .or_else(|| obj.get("class"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .collect();

        Ok(EvidenceRef {
            id: EventId(self.id),
            camera_name: self
                .camera_name
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNKNOWN_CAMERA.to_string()),
            event_type: self.event_type,
            severity: self.severity.parse()?,
            timestamp: self.timestamp,
            summary: self.summary,
            frame: FrameRef::from_wire(self.frame_path),
            thumbnail: FrameRef::from_wire(self.thumbnail_path),
            detected_objects,
        })
    }
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RawSession {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub messages: Option<Vec<RawMessage>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMessage {
    pub id: i64,
    pub role: String,
    pub content: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: SessionId,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Last activity. Falls back to `created_at` when the server omits it.
    pub updated_at: DateTime<Utc>,
}

impl SessionSummary {
    /// Title to display, or the fallback label for untitled sessions.
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title,
            _ => FALLBACK_SESSION_TITLE,
        }
    }
}

/// One persisted message of a session's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: i64,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDetail {
    pub summary: SessionSummary,
    /// Ordered by creation. Rows with roles other than user/assistant are
    /// left out.
    pub messages: Vec<HistoryEntry>,
}

impl RawSession {
    pub fn validate_summary(&self) -> Result<SessionSummary, ProtocolError> {
        let id = SessionId::from_wire(self.id)
            .ok_or_else(|| ProtocolError::InvalidSessionId(self.id.to_string()))?;
        Ok(SessionSummary {
            id,
            title: self.title.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at.unwrap_or(self.created_at),
        })
    }

    pub fn validate_detail(self) -> Result<SessionDetail, ProtocolError> {
        let summary = self.validate_summary()?;
        let messages = self
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|m| {
                let role = m.role.parse::<Role>().ok()?;
                Some(HistoryEntry {
                    id: m.id,
                    role,
                    content: m.content,
                    created_at: m.created_at,
                })
            })
            .collect();
        Ok(SessionDetail { summary, messages })
    }
}

// ---------------------------------------------------------------------------
// Suggestions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RawSuggestions {
    #[serde(default)]
    pub suggestions: Vec<String>,
}

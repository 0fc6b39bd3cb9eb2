//! In-memory [`AssistantService`] and fixtures for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::oneshot;

use chowkidaar_net::{ApiError, AssistantService, ClientConfig, Result, StaticToken};
use chowkidaar_shared::{
    ChatReply, ChatRequest, EventId, EvidenceRef, FrameRef, HistoryEntry, Role, SessionDetail,
    SessionId, SessionSummary, Severity,
};

use crate::context::AssistantContext;

type Reply = std::result::Result<ChatReply, ApiError>;

enum Scripted {
    Reply(Reply),
    /// Resolved when the test sends on the paired sender.
    Gated(oneshot::Receiver<Reply>),
}

/// Replies to chat requests in the order they were scripted.
#[derive(Default)]
pub struct ScriptedService {
    sends: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ChatRequest>>,
    sessions: Mutex<Vec<SessionSummary>>,
    details: Mutex<HashMap<SessionId, SessionDetail>>,
    suggestions: Mutex<Option<Vec<String>>>,
    pub list_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
    pub fail_list: AtomicBool,
    pub fail_detail: AtomicBool,
    pub fail_delete: AtomicBool,
}

impl ScriptedService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_sessions(sessions: Vec<SessionSummary>) -> Arc<Self> {
        let service = Self::default();
        *service.sessions.lock().unwrap() = sessions;
        Arc::new(service)
    }

    pub fn put_detail(&self, detail: SessionDetail) {
        self.details.lock().unwrap().insert(detail.summary.id, detail);
    }

    /// Simulate activity on `id` from elsewhere.
    pub fn touch_session(&self, id: SessionId, by: Duration) {
        for session in self.sessions.lock().unwrap().iter_mut() {
            if session.id == id {
                session.updated_at += by;
            }
        }
    }

    pub fn set_suggestions(&self, suggestions: Option<Vec<String>>) {
        *self.suggestions.lock().unwrap() = suggestions;
    }

    pub fn push_reply(&self, reply: Reply) {
        self.sends.lock().unwrap().push_back(Scripted::Reply(reply));
    }

    pub fn push_gated(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.sends.lock().unwrap().push_back(Scripted::Gated(rx));
        tx
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssistantService for ScriptedService {
    async fn list_sessions(&self, limit: u32) -> Result<Vec<SessionSummary>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(failure());
        }
        let mut sessions = self.sessions.lock().unwrap().clone();
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        sessions.truncate(limit as usize);
        Ok(sessions)
    }

    async fn get_session_detail(&self, id: SessionId) -> Result<SessionDetail> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_detail.load(Ordering::SeqCst) {
            return Err(failure());
        }
        let mut detail = self
            .details
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                status: 404,
                detail: "Session not found".into(),
            })?;
        if let Some(current) = self.sessions.lock().unwrap().iter().find(|s| s.id == id) {
            detail.summary = current.clone();
        }
        Ok(detail)
    }

    async fn send_message(&self, request: &ChatRequest) -> Result<ChatReply> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.sends.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Reply(reply)) => reply,
            Some(Scripted::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(ApiError::Unavailable("gate dropped".into()))),
            None => Err(ApiError::Unavailable("no scripted reply".into())),
        }
    }

    async fn delete_session(&self, id: SessionId) -> Result<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 503,
                detail: "Database unavailable".into(),
            });
        }
        self.sessions.lock().unwrap().retain(|s| s.id != id);
        self.details.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn get_suggestions(&self) -> Result<Vec<String>> {
        self.suggestions
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(failure)
    }
}

pub fn context(service: Arc<ScriptedService>) -> AssistantContext {
    AssistantContext::with_service(
        ClientConfig::default(),
        service,
        Arc::new(StaticToken::new("test-token")),
    )
}

pub fn failure() -> ApiError {
    ApiError::Unavailable("connection refused".into())
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
}

pub fn summary(id: i64, title: Option<&str>) -> SessionSummary {
    SessionSummary {
        id: SessionId(id),
        title: title.map(str::to_string),
        created_at: base_time(),
        updated_at: base_time(),
    }
}

/// Detail whose history alternates user/assistant over `contents`.
pub fn detail(id: i64, contents: &[&str]) -> SessionDetail {
    let messages = contents
        .iter()
        .enumerate()
        .map(|(i, content)| HistoryEntry {
            id: id * 100 + i as i64,
            role: if i % 2 == 0 { Role::User } else { Role::Assistant },
            content: content.to_string(),
            created_at: base_time() + Duration::seconds(i as i64),
        })
        .collect();
    SessionDetail {
        summary: summary(id, None),
        messages,
    }
}

pub fn evidence(id: i64, has_frame: bool) -> EvidenceRef {
    EvidenceRef {
        id: EventId(id),
        camera_name: "Front Door".into(),
        event_type: "person_detected".into(),
        severity: Severity::Medium,
        timestamp: base_time(),
        summary: Some(format!("Person near the door ({id})")),
        frame: has_frame.then(|| FrameRef(format!("/frames/{id}.jpg"))),
        thumbnail: None,
        detected_objects: vec!["person".into()],
    }
}

/// A reply carrying `evidence` records with ids `1..=evidence`.
pub fn reply(text: &str, session: Option<i64>, evidence_count: i64) -> ChatReply {
    let records: Vec<EvidenceRef> = (1..=evidence_count).map(|i| evidence(i, true)).collect();
    ChatReply {
        text: text.to_string(),
        session_id: session.map(SessionId),
        related_event_ids: records.iter().map(|r| r.id).collect(),
        related_events: (!records.is_empty()).then_some(records),
        dropped_events: 0,
    }
}

//! Publish/subscribe contracts between the registry, the detail cache and
//! whatever renders the conversation.
//!
//! Both channels are `tokio::sync::broadcast`: publishers never block and a
//! missing subscriber is not an error.

use tokio::sync::broadcast;
use tracing::trace;

use chowkidaar_shared::{SessionId, SessionSummary};

/// Capacity of every event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Emitted by the session registry.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEvent {
    /// The session list was re-fetched.
    Refreshed(Vec<SessionSummary>),
    /// A session was deleted on the server.
    Deleted(SessionId),
}

/// Emitted by a conversation view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// The view now shows another conversation (`None` = fresh draft).
    Switched { session: Option<SessionId> },
    /// Messages were appended or removed.
    BufferChanged { len: usize },
    /// A session's history replaced the buffer.
    HistoryLoaded { session: SessionId, len: usize },
    /// A draft received its server session id.
    SessionPromoted { session: SessionId },
    /// Something failed; show it to the user briefly.
    Notice(Notice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    SendFailed,
    LoadFailed,
    DeleteFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

pub(crate) fn publish<E: std::fmt::Debug>(tx: &broadcast::Sender<E>, event: E) {
    if let Err(e) = tx.send(event) {
        trace!(event = ?e.0, "No subscribers for event");
    }
}

pub(crate) fn publish_notice(
    tx: &broadcast::Sender<ViewEvent>,
    kind: NoticeKind,
    message: impl Into<String>,
) {
    publish(
        tx,
        ViewEvent::Notice(Notice {
            kind,
            message: message.into(),
        }),
    );
}

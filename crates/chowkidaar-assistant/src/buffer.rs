//! The local message buffer of the conversation being viewed.
//!
//! Messages are only ever appended (or loaded wholesale from history); they
//! are never reordered. The dispatcher's optimistic user message goes in
//! through [`MessageBuffer::append_tentative`], which hands back a
//! [`PendingAppend`] that must be settled exactly once: confirmed when the
//! server accepts the message, reverted when the send fails.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use chowkidaar_shared::{HistoryEntry, MessageId, Role};

use crate::evidence::BoundedEvidence;

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Assistant replies only.
    pub evidence: Option<BoundedEvidence>,
}

impl From<&HistoryEntry> for Message {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            id: MessageId::Server(entry.id),
            role: entry.role,
            content: entry.content.clone(),
            created_at: entry.created_at,
            evidence: None,
        }
    }
}

/// Handle to a tentatively appended message.
#[must_use = "a tentative append must be confirmed or reverted"]
#[derive(Debug, PartialEq, Eq)]
pub struct PendingAppend {
    id: MessageId,
}

impl PendingAppend {
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Give up on the handle without touching any buffer. Used when the
    /// buffer it points into has been replaced in the meantime.
    pub fn abandon(self) {}
}

#[derive(Debug, Clone, Default)]
pub struct MessageBuffer {
    messages: Vec<Message>,
    pending: Option<MessageId>,
}

impl MessageBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Id of the tentative message awaiting confirmation, if any.
    pub fn pending(&self) -> Option<MessageId> {
        self.pending
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.messages.iter().any(|m| m.id == id)
    }

    /// A local id unused by any message in the buffer.
    fn fresh_local_id(&self) -> MessageId {
        loop {
            let id = MessageId::new_local();
            if !self.contains(id) {
                return id;
            }
        }
    }

    /// Append a confirmed message and return its new local id.
    pub fn append(
        &mut self,
        role: Role,
        content: impl Into<String>,
        evidence: Option<BoundedEvidence>,
    ) -> MessageId {
        let id = self.fresh_local_id();
        self.messages.push(Message {
            id,
            role,
            content: content.into(),
            created_at: Utc::now(),
            evidence,
        });
        id
    }

    /// Append a user message that the server has not accepted yet.
    pub fn append_tentative(&mut self, content: impl Into<String>) -> PendingAppend {
        let id = self.append(Role::User, content, None);
        self.pending = Some(id);
        PendingAppend { id }
    }

    /// The server accepted the tentative message. Returns `false` if the
    /// handle no longer refers to this buffer's pending message.
    pub fn confirm(&mut self, handle: PendingAppend) -> bool {
        if self.pending == Some(handle.id) {
            self.pending = None;
            true
        } else {
            debug!(id = %handle.id, "Confirm for a message that is no longer pending");
            false
        }
    }

    /// Remove the tentative message, and only it.
    pub fn revert(&mut self, handle: PendingAppend) -> Option<Message> {
        if self.pending == Some(handle.id) {
            self.pending = None;
        }
        let position = self.messages.iter().rposition(|m| m.id == handle.id)?;
        if position + 1 != self.messages.len() {
            warn!(id = %handle.id, "Reverting a tentative message that is not the newest entry");
        }
        Some(self.messages.remove(position))
    }

    /// Replace the contents with a session's persisted history.
    ///
    /// Loaded history is authoritative. The one exception is a tentative
    /// message still in flight: the server cannot have stored it yet, so it
    /// is carried over at the tail to be settled by its send.
    pub fn replace_with_history(&mut self, history: &[HistoryEntry]) {
        let carried = self
            .pending
            .and_then(|id| self.messages.iter().find(|m| m.id == id).cloned());

        self.messages = history.iter().map(Message::from).collect();
        if let Some(message) = carried {
            self.messages.push(message);
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.pending = None;
    }
}

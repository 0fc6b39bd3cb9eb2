//! State of one conversation view.
//!
//! The [`ConversationState`] struct lives behind a mutex inside the
//! dispatcher. The lock is only ever held for synchronous bookkeeping,
//! never across a network call.

use chowkidaar_shared::SessionId;

use crate::buffer::{Message, MessageBuffer};

/// What a view is showing right now.
#[derive(Debug, Default)]
pub struct ConversationState {
    /// The session being viewed.
    /// `None` for a draft conversation that has not been sent yet.
    pub active_session: Option<SessionId>,

    /// Ordered messages of the viewed conversation.
    pub buffer: MessageBuffer,

    /// Whether a send from this view is awaiting its reply.
    pub send_in_flight: bool,

    /// Bumped every time the view switches conversation. Responses tagged
    /// with an older generation belong to a conversation the user left.
    generation: u64,

    /// Whether the buffer holds the whole conversation: its history was
    /// loaded, or it started here as a draft.
    history_loaded: bool,
}

impl ConversationState {
    /// Create a view on a fresh draft.
    pub fn new() -> Self {
        Self {
            history_loaded: true,
            ..Self::default()
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    pub fn history_loaded(&self) -> bool {
        self.history_loaded
    }

    pub fn mark_history_loaded(&mut self) {
        self.history_loaded = true;
    }

    /// Start showing another conversation: empty buffer, nothing in flight.
    /// Returns the new generation.
    pub fn switch_to(&mut self, session: Option<SessionId>) -> u64 {
        self.generation += 1;
        self.active_session = session;
        self.buffer.clear();
        self.send_in_flight = false;
        self.history_loaded = session.is_none();
        self.generation
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            active_session: self.active_session,
            messages: self.buffer.messages().to_vec(),
            send_in_flight: self.send_in_flight,
        }
    }
}

/// Owned copy of a view's state for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSnapshot {
    pub active_session: Option<SessionId>,
    pub messages: Vec<Message>,
    pub send_in_flight: bool,
}

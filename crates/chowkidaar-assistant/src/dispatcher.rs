//! The chat dispatcher: send a message, optimistically.
//!
//! ```text
//!            submit (non-empty, nothing in flight)
//!   Idle ───────────────────────────────────────────▶ Sending
//!    ▲                                                  │
//!    └──── reply: confirm + append assistant message ◀──┤
//!    └──── error: revert the optimistic message ◀───────┘
//! ```
//!
//! The user message is appended before the request goes out. The reply (or
//! the failure) is applied only if the view still shows the conversation the
//! request was sent from; otherwise it is dropped on arrival. Requests are
//! never aborted.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use chowkidaar_net::{ApiError, AssistantService};
use chowkidaar_shared::{ChatReply, ChatRequest, EventId, MessageId, Role, SessionId};

use crate::buffer::PendingAppend;
use crate::context::AssistantContext;
use crate::detail_cache::DetailCache;
use crate::error::{AssistantError, Result};
use crate::events::{publish, publish_notice, NoticeKind, ViewEvent, EVENT_CHANNEL_CAPACITY};
use crate::evidence::correlate;
use crate::registry::SessionRegistry;
use crate::state::{ConversationSnapshot, ConversationState};

/// Why a submission did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Text was empty after trimming.
    EmptyInput,
    /// Another send from this view is still awaiting its reply.
    SendInFlight,
}

/// Result of [`ChatDispatcher::submit`].
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The reply was appended.
    Delivered {
        user: MessageId,
        assistant: MessageId,
        session: Option<SessionId>,
        /// The draft was promoted to this newly assigned session.
        promoted: Option<SessionId>,
        /// Evidence records attached to the reply, after the cap.
        evidence: usize,
        /// Every event the server grounded the reply on.
        related_events: Vec<EventId>,
    },
    /// The request failed and the optimistic message was removed.
    RolledBack(AssistantError),
    /// The view moved on before the response arrived; nothing was applied.
    Discarded,
    /// Guard violation; no state change, no request.
    Rejected(RejectReason),
}

/// One conversation view and its send state machine.
pub struct ChatDispatcher {
    state: Mutex<ConversationState>,
    service: Arc<dyn AssistantService>,
    registry: Arc<SessionRegistry>,
    cache: Arc<DetailCache>,
    include_events_context: bool,
    events: broadcast::Sender<ViewEvent>,
}

impl ChatDispatcher {
    pub fn new(
        context: &AssistantContext,
        registry: Arc<SessionRegistry>,
        cache: Arc<DetailCache>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Mutex::new(ConversationState::new()),
            service: context.service.clone(),
            registry,
            cache,
            include_events_context: context.config.include_events_context,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    pub(crate) fn events(&self) -> &broadcast::Sender<ViewEvent> {
        &self.events
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        self.lock().snapshot()
    }

    pub fn active_session(&self) -> Option<SessionId> {
        self.lock().active_session
    }

    pub fn is_sending(&self) -> bool {
        self.lock().send_in_flight
    }

    fn lock(&self) -> MutexGuard<'_, ConversationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -----------------------------------------------------------------------
    // Sending
    // -----------------------------------------------------------------------

    pub async fn submit(&self, text: &str) -> DispatchOutcome {
        let content = text.trim();
        if content.is_empty() {
            debug!("Ignoring empty submission");
            return DispatchOutcome::Rejected(RejectReason::EmptyInput);
        }

        let (pending, session, generation, len) = {
            let mut state = self.lock();
            if state.send_in_flight {
                debug!("Ignoring submission while a send is in flight");
                return DispatchOutcome::Rejected(RejectReason::SendInFlight);
            }
            state.send_in_flight = true;
            let pending = state.buffer.append_tentative(content);
            (
                pending,
                state.active_session,
                state.generation(),
                state.buffer.len(),
            )
        };
        publish(&self.events, ViewEvent::BufferChanged { len });

        let request = ChatRequest {
            message: content.to_string(),
            session_id: session,
            include_events_context: self.include_events_context,
        };
        info!(session = ?session, message = %pending.id(), "Dispatching chat message");

        match self.service.send_message(&request).await {
            Ok(reply) => self.on_reply(pending, session, generation, reply).await,
            Err(e) => self.on_failure(pending, generation, e),
        }
    }

    async fn on_reply(
        &self,
        pending: PendingAppend,
        sent_from: Option<SessionId>,
        generation: u64,
        reply: ChatReply,
    ) -> DispatchOutcome {
        let related_events = reply.related_event_ids;
        let evidence = reply.related_events.and_then(correlate);
        let evidence_count = evidence.as_ref().map_or(0, |e| e.len());

        let (user, assistant, session, promoted, len) = {
            let mut state = self.lock();
            if !state.is_current(generation) {
                pending.abandon();
                info!(session = ?sent_from, "Discarding reply for a conversation no longer shown");
                return DispatchOutcome::Discarded;
            }

            let user = pending.id();
            state.buffer.confirm(pending);
            let assistant = state.buffer.append(Role::Assistant, reply.text, evidence);

            let promoted = match (sent_from, reply.session_id) {
                (None, Some(assigned)) => {
                    state.active_session = Some(assigned);
                    Some(assigned)
                }
                _ => None,
            };
            state.send_in_flight = false;
            (
                user,
                assistant,
                state.active_session,
                promoted,
                state.buffer.len(),
            )
        };

        publish(&self.events, ViewEvent::BufferChanged { len });
        if let Some(session) = promoted {
            info!(session = %session, "Draft promoted to session");
            publish(&self.events, ViewEvent::SessionPromoted { session });
        }
        debug!(session = ?session, evidence = evidence_count, "Reply delivered");

        // New or touched session: recency and title changed server-side.
        if let Err(e) = self.registry.refresh().await {
            debug!(error = %e, "Session list not refreshed after reply");
            // The cache cannot see the new activity, so forget the old history.
            if let Some(session) = session {
                self.cache.invalidate(session);
            }
        }

        DispatchOutcome::Delivered {
            user,
            assistant,
            session,
            promoted,
            evidence: evidence_count,
            related_events,
        }
    }

    fn on_failure(&self, pending: PendingAppend, generation: u64, error: ApiError) -> DispatchOutcome {
        let len = {
            let mut state = self.lock();
            if !state.is_current(generation) {
                pending.abandon();
                debug!(error = %error, "Dropping failure of a send from a conversation no longer shown");
                return DispatchOutcome::Discarded;
            }
            state.buffer.revert(pending);
            state.send_in_flight = false;
            state.buffer.len()
        };

        warn!(error = %error, "Send failed, optimistic message rolled back");
        publish(&self.events, ViewEvent::BufferChanged { len });
        publish_notice(
            &self.events,
            NoticeKind::SendFailed,
            format!("Failed to send message: {error}"),
        );
        DispatchOutcome::RolledBack(error.into())
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Show a fresh draft conversation.
    pub fn new_draft(&self) {
        self.lock().switch_to(None);
        publish(&self.events, ViewEvent::Switched { session: None });
    }

    /// Show an existing session and load its history.
    ///
    /// Selecting the session already shown does nothing once its history is
    /// in; after a failed load it retries without switching. If the user
    /// moves on before the history arrives, it is not applied.
    pub async fn select_session(&self, id: SessionId) -> Result<()> {
        let (generation, switched) = {
            let mut state = self.lock();
            if state.active_session == Some(id) {
                if state.history_loaded() {
                    return Ok(());
                }
                debug!(session = %id, "Retrying history load");
                (state.generation(), false)
            } else {
                (state.switch_to(Some(id)), true)
            }
        };
        if switched {
            publish(&self.events, ViewEvent::Switched { session: Some(id) });
        }

        let detail = match self.cache.get_detail(id).await {
            Ok(detail) => detail,
            Err(e) => {
                if self.lock().is_current(generation) {
                    publish_notice(
                        &self.events,
                        NoticeKind::LoadFailed,
                        format!("Failed to load conversation: {e}"),
                    );
                }
                return Err(e);
            }
        };

        let len = {
            let mut state = self.lock();
            if !state.is_current(generation) {
                debug!(session = %id, "Discarding history for a conversation no longer shown");
                return Ok(());
            }
            state.buffer.replace_with_history(&detail.messages);
            state.mark_history_loaded();
            state.buffer.len()
        };
        debug!(session = %id, messages = len, "History loaded");
        publish(&self.events, ViewEvent::HistoryLoaded { session: id, len });
        Ok(())
    }

    /// Reset to a draft if `id` is the session being shown. Any reply still
    /// in flight for it will be discarded. Returns whether a reset happened.
    pub fn reset_if_active(&self, id: SessionId) -> bool {
        {
            let mut state = self.lock();
            if state.active_session != Some(id) {
                return false;
            }
            state.switch_to(None);
        }
        publish(&self.events, ViewEvent::Switched { session: None });
        true
    }
}

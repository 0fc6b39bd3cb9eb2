//! Per-session history cache.
//!
//! Revisiting a session is served from memory. Entries are invalidated by
//! the registry's events only: a deleted session is dropped right away, and
//! a refreshed list drops sessions that vanished or show newer activity
//! than the cached copy.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, warn};

use chowkidaar_net::AssistantService;
use chowkidaar_shared::{SessionDetail, SessionId};

use crate::context::AssistantContext;
use crate::error::Result;
use crate::events::RegistryEvent;

pub struct DetailCache {
    service: Arc<dyn AssistantService>,
    entries: Mutex<HashMap<SessionId, Arc<SessionDetail>>>,
    invalidations: Mutex<broadcast::Receiver<RegistryEvent>>,
}

impl DetailCache {
    /// `invalidations` is a subscription to the session registry.
    pub fn new(
        context: &AssistantContext,
        invalidations: broadcast::Receiver<RegistryEvent>,
    ) -> Self {
        Self {
            service: context.service.clone(),
            entries: Mutex::new(HashMap::new()),
            invalidations: Mutex::new(invalidations),
        }
    }

    /// History of `id`, from cache when possible. A failed fetch leaves the
    /// cache as it was.
    pub async fn get_detail(&self, id: SessionId) -> Result<Arc<SessionDetail>> {
        self.apply_invalidations();

        if let Some(hit) = self.entry(id) {
            debug!(session = %id, "Session detail cache hit");
            return Ok(hit);
        }

        let detail = match self.service.get_session_detail(id).await {
            Ok(detail) => Arc::new(detail),
            Err(e) => {
                warn!(session = %id, error = %e, "Failed to load session detail");
                return Err(e.into());
            }
        };

        // The session may have been deleted while the fetch was running.
        let deleted = self.apply_invalidations();
        if deleted.contains(&id) {
            debug!(session = %id, "Not caching detail of a deleted session");
        } else {
            self.lock_entries().insert(id, detail.clone());
        }
        Ok(detail)
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.apply_invalidations();
        self.lock_entries().contains_key(&id)
    }

    pub fn invalidate(&self, id: SessionId) {
        if self.lock_entries().remove(&id).is_some() {
            debug!(session = %id, "Session detail invalidated");
        }
    }

    fn entry(&self, id: SessionId) -> Option<Arc<SessionDetail>> {
        self.lock_entries().get(&id).cloned()
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<SessionId, Arc<SessionDetail>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drain pending registry events. Returns the ids deleted meanwhile.
    fn apply_invalidations(&self) -> Vec<SessionId> {
        let mut deleted = Vec::new();
        let mut rx = self
            .invalidations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        loop {
            match rx.try_recv() {
                Ok(RegistryEvent::Deleted(id)) => {
                    self.invalidate(id);
                    deleted.push(id);
                }
                Ok(RegistryEvent::Refreshed(sessions)) => {
                    self.lock_entries().retain(|id, cached| {
                        let keep = sessions.iter().any(|s| {
                            s.id == *id && s.updated_at <= cached.summary.updated_at
                        });
                        if !keep {
                            debug!(session = %id, "Dropping outdated session detail");
                        }
                        keep
                    });
                }
                Err(TryRecvError::Lagged(missed)) => {
                    warn!(missed, "Registry events lagged, clearing detail cache");
                    self.lock_entries().clear();
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        deleted
    }
}

//! The session registry: the list of known conversations.
//!
//! Keeps the last fetched snapshot in memory and republishes it as a
//! [`RegistryEvent`] whenever it changes, so the detail cache and any UI
//! observer can react without polling.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use chowkidaar_net::AssistantService;
use chowkidaar_shared::{SessionId, SessionSummary};

use crate::context::AssistantContext;
use crate::error::Result;
use crate::events::{publish, RegistryEvent, EVENT_CHANNEL_CAPACITY};

pub struct SessionRegistry {
    service: Arc<dyn AssistantService>,
    page_size: u32,
    sessions: RwLock<Vec<SessionSummary>>,
    events: broadcast::Sender<RegistryEvent>,
}

impl SessionRegistry {
    pub fn new(context: &AssistantContext) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            service: context.service.clone(),
            page_size: context.config.session_page_size,
            sessions: RwLock::new(Vec::new()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    /// Last fetched sessions, most recently active first.
    pub fn sessions(&self) -> Vec<SessionSummary> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get(&self, id: SessionId) -> Option<SessionSummary> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    /// Re-fetch the session list. On failure the previous snapshot stays.
    pub async fn refresh(&self) -> Result<Vec<SessionSummary>> {
        let sessions = match self.service.list_sessions(self.page_size).await {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!(error = %e, "Failed to refresh sessions");
                return Err(e.into());
            }
        };

        debug!(count = sessions.len(), "Session list refreshed");
        *self.sessions.write().unwrap_or_else(PoisonError::into_inner) = sessions.clone();
        publish(&self.events, RegistryEvent::Refreshed(sessions.clone()));
        Ok(sessions)
    }

    /// Delete a session on the server.
    ///
    /// On failure nothing changes locally. On success the session is
    /// dropped from the snapshot, a [`RegistryEvent::Deleted`] is published
    /// and the list is refreshed; a failed refresh is logged, not returned,
    /// since the deletion itself went through.
    ///
    /// Resetting a view that was showing the session is the caller's job.
    pub async fn delete(&self, id: SessionId) -> Result<()> {
        if let Err(e) = self.service.delete_session(id).await {
            warn!(session = %id, error = %e, "Failed to delete session");
            return Err(e.into());
        }

        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|s| s.id != id);
        publish(&self.events, RegistryEvent::Deleted(id));
        info!(session = %id, "Session deleted");

        if let Err(e) = self.refresh().await {
            debug!(error = %e, "Session list not refreshed after delete");
        }
        Ok(())
    }

    /// Local title filter over the current snapshot. See [`filter_sessions`].
    pub fn filter(&self, query: &str) -> Vec<SessionSummary> {
        filter_sessions(&self.sessions.read().unwrap_or_else(PoisonError::into_inner), query)
    }
}

/// Case-insensitive substring match over display titles, keeping order.
///
/// Untitled sessions match against the fallback label. Purely local; an
/// empty query keeps everything.
pub fn filter_sessions(sessions: &[SessionSummary], query: &str) -> Vec<SessionSummary> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return sessions.to_vec();
    }
    sessions
        .iter()
        .filter(|s| s.display_title().to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use crate::testing::{context, summary, ScriptedService};

    #[test]
    fn test_filter_scenario() {
        let sessions = vec![
            summary(1, Some("Project Review")),
            summary(2, Some("Weather")),
            summary(3, Some("Project Plan")),
        ];
        let titles: Vec<String> = filter_sessions(&sessions, "proj")
            .iter()
            .map(|s| s.display_title().to_string())
            .collect();
        assert_eq!(titles, vec!["Project Review", "Project Plan"]);
    }

    #[test]
    fn test_filter_untitled_and_empty_query() {
        let sessions = vec![summary(1, None), summary(2, Some("Garage"))];
        let hits = filter_sessions(&sessions, "new chat");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, SessionId(1));
        assert_eq!(filter_sessions(&sessions, "   ").len(), 2);
        assert!(filter_sessions(&sessions, "porch").is_empty());
    }

    #[tokio::test]
    async fn test_refresh_publishes_snapshot() {
        let service = ScriptedService::with_sessions(vec![summary(1, Some("Gate"))]);
        let registry = SessionRegistry::new(&context(service.clone()));
        let mut rx = registry.subscribe();

        let listed = registry.refresh().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(registry.sessions(), listed);
        assert_eq!(rx.try_recv().unwrap(), RegistryEvent::Refreshed(listed));
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_snapshot() {
        let service = ScriptedService::with_sessions(vec![summary(1, Some("Gate"))]);
        let registry = SessionRegistry::new(&context(service.clone()));
        registry.refresh().await.unwrap();

        service.fail_list.store(true, Ordering::SeqCst);
        assert!(registry.refresh().await.is_err());
        assert_eq!(registry.sessions().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_success() {
        let service =
            ScriptedService::with_sessions(vec![summary(1, Some("Gate")), summary(2, None)]);
        let registry = SessionRegistry::new(&context(service.clone()));
        registry.refresh().await.unwrap();
        let mut rx = registry.subscribe();

        registry.delete(SessionId(1)).await.unwrap();
        assert!(registry.get(SessionId(1)).is_none());
        assert_eq!(rx.try_recv().unwrap(), RegistryEvent::Deleted(SessionId(1)));
        assert!(matches!(rx.try_recv().unwrap(), RegistryEvent::Refreshed(_)));
    }

    #[tokio::test]
    async fn test_delete_survives_failed_refresh() {
        let service =
            ScriptedService::with_sessions(vec![summary(1, Some("Gate")), summary(2, None)]);
        let registry = SessionRegistry::new(&context(service.clone()));
        registry.refresh().await.unwrap();
        let mut rx = registry.subscribe();

        service.fail_list.store(true, Ordering::SeqCst);
        registry.delete(SessionId(1)).await.unwrap();
        assert_eq!(registry.sessions(), vec![summary(2, None)]);
        assert_eq!(rx.try_recv().unwrap(), RegistryEvent::Deleted(SessionId(1)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_delete_failure_changes_nothing() {
        let service = ScriptedService::with_sessions(vec![summary(1, Some("Gate"))]);
        let registry = SessionRegistry::new(&context(service.clone()));
        registry.refresh().await.unwrap();
        let mut rx = registry.subscribe();

        service.fail_delete.store(true, Ordering::SeqCst);
        assert!(registry.delete(SessionId(1)).await.is_err());
        assert!(registry.get(SessionId(1)).is_some());
        assert!(rx.try_recv().is_err());
    }
}

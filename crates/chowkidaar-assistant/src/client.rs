//! The assistant facade: one registry, one detail cache and one conversation
//! view wired to the same context.

use std::sync::Arc;

use tracing::{debug, info};

use chowkidaar_shared::SessionId;

use crate::context::AssistantContext;
use crate::detail_cache::DetailCache;
use crate::dispatcher::ChatDispatcher;
use crate::error::Result;
use crate::events::{publish_notice, NoticeKind};
use crate::registry::SessionRegistry;
use crate::suggestions::SuggestionProvider;

pub struct Assistant {
    context: AssistantContext,
    registry: Arc<SessionRegistry>,
    cache: Arc<DetailCache>,
    chat: ChatDispatcher,
    suggestions: SuggestionProvider,
}

impl Assistant {
    pub fn new(context: AssistantContext) -> Self {
        let registry = Arc::new(SessionRegistry::new(&context));
        let cache = Arc::new(DetailCache::new(&context, registry.subscribe()));
        let chat = ChatDispatcher::new(&context, registry.clone(), cache.clone());
        let suggestions = SuggestionProvider::new(&context);
        Self {
            context,
            registry,
            cache,
            chat,
            suggestions,
        }
    }

    /// Initial session list. A failure is logged and leaves the list empty.
    pub async fn start(&self) {
        info!(api = %self.context.config.api_url, "Starting assistant");
        if let Ok(sessions) = self.registry.refresh().await {
            debug!(count = sessions.len(), "Initial session list loaded");
        }
    }

    pub fn context(&self) -> &AssistantContext {
        &self.context
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &DetailCache {
        &self.cache
    }

    pub fn chat(&self) -> &ChatDispatcher {
        &self.chat
    }

    pub fn suggestions(&self) -> &SuggestionProvider {
        &self.suggestions
    }

    /// Delete a session everywhere.
    ///
    /// If the view was showing it, the view resets to a fresh draft and any
    /// reply still in flight for it is dropped. A failure changes nothing
    /// and is reported as a notice on the view's channel.
    pub async fn delete_session(&self, id: SessionId) -> Result<()> {
        if let Err(e) = self.registry.delete(id).await {
            publish_notice(
                self.chat.events(),
                NoticeKind::DeleteFailed,
                format!("Failed to delete conversation: {e}"),
            );
            return Err(e);
        }
        self.cache.invalidate(id);
        if self.chat.reset_if_active(id) {
            debug!(session = %id, "Deleted session was being viewed, reset to draft");
        }
        Ok(())
    }
}

//! The explicit context handed to every component.
//!
//! Built once at application start; owns the configuration, the service
//! handle and the media URL builder (which carries the token source).

use std::sync::Arc;

use chowkidaar_net::{
    token_provider_from_config, AssistantService, ClientConfig, HttpAssistantService, MediaUrls,
    TokenProvider,
};

use crate::error::Result;

#[derive(Clone)]
pub struct AssistantContext {
    pub config: ClientConfig,
    pub service: Arc<dyn AssistantService>,
    pub media: MediaUrls,
}

impl AssistantContext {
    /// Wire up the HTTP service described by `config`.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let tokens = token_provider_from_config(&config);
        let service = HttpAssistantService::new(&config, tokens.clone())?;
        Ok(Self::with_service(config, Arc::new(service), tokens))
    }

    /// Use an already constructed service.
    pub fn with_service(
        config: ClientConfig,
        service: Arc<dyn AssistantService>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        let media = MediaUrls::new(config.api_url.clone(), tokens);
        Self {
            config,
            service,
            media,
        }
    }
}

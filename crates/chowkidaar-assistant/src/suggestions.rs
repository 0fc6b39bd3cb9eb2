//! Example prompts for the empty conversation, and the compose input they
//! pre-fill.

use std::sync::Arc;

use tracing::{debug, warn};

use chowkidaar_net::AssistantService;
use chowkidaar_shared::constants::DEFAULT_SUGGESTIONS;

use crate::context::AssistantContext;

pub struct SuggestionProvider {
    service: Arc<dyn AssistantService>,
}

impl SuggestionProvider {
    pub fn new(context: &AssistantContext) -> Self {
        Self {
            service: context.service.clone(),
        }
    }

    /// Server prompts, or the built-in list when there are none. Never fails.
    pub async fn fetch(&self) -> Vec<String> {
        match self.service.get_suggestions().await {
            Ok(suggestions) => {
                let suggestions: Vec<String> = suggestions
                    .into_iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if suggestions.is_empty() {
                    debug!("Server returned no suggestions, using defaults");
                    fallback()
                } else {
                    suggestions
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch suggestions, using defaults");
                fallback()
            }
        }
    }
}

fn fallback() -> Vec<String> {
    DEFAULT_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
}

/// Text waiting to be sent. Filling it never sends anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composer {
    text: String,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Replace the input with the chosen suggestion.
    pub fn apply_suggestion(&mut self, suggestion: &str) {
        self.text = suggestion.to_string();
    }

    /// Hand the text over for sending and empty the input.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testing::{context, ScriptedService};

    #[tokio::test]
    async fn test_server_suggestions_win() {
        let service = ScriptedService::new();
        service.set_suggestions(Some(vec![
            "Who was at the gate?".into(),
            "  ".into(),
        ]));
        let provider = SuggestionProvider::new(&context(service));
        assert_eq!(provider.fetch().await, vec!["Who was at the gate?".to_string()]);
    }

    #[tokio::test]
    async fn test_falls_back_on_error_or_empty() {
        let service = ScriptedService::new();
        let provider = SuggestionProvider::new(&context(service.clone()));
        assert_eq!(provider.fetch().await.len(), DEFAULT_SUGGESTIONS.len());

        service.set_suggestions(Some(Vec::new()));
        assert_eq!(provider.fetch().await[0], DEFAULT_SUGGESTIONS[0]);
    }

    #[test]
    fn test_composer_prefill_and_take() {
        let mut composer = Composer::new();
        composer.set_text("draft");
        composer.apply_suggestion(DEFAULT_SUGGESTIONS[1]);
        assert_eq!(composer.text(), DEFAULT_SUGGESTIONS[1]);
        assert_eq!(composer.take(), DEFAULT_SUGGESTIONS[1]);
        assert!(composer.text().is_empty());
    }
}

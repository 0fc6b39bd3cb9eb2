//! Client core of the Chowkidaar security assistant: session list, history
//! cache and the optimistic chat view.

pub mod buffer;
pub mod client;
pub mod context;
pub mod detail_cache;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod evidence;
pub mod registry;
pub mod state;
pub mod suggestions;

#[cfg(test)]
mod testing;

use tracing_subscriber::{fmt, EnvFilter};

pub use buffer::{Message, MessageBuffer, PendingAppend};
pub use client::Assistant;
pub use context::AssistantContext;
pub use detail_cache::DetailCache;
pub use dispatcher::{ChatDispatcher, DispatchOutcome, RejectReason};
pub use error::{AssistantError, Result};
pub use events::{Notice, NoticeKind, RegistryEvent, ViewEvent};
pub use evidence::{cards, correlate, BoundedEvidence, EvidenceCard, ImageSource};
pub use registry::{filter_sessions, SessionRegistry};
pub use state::ConversationSnapshot;
pub use suggestions::{Composer, SuggestionProvider};

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("chowkidaar_assistant=debug,chowkidaar_net=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

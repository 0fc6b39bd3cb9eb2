//! Command execution for the terminal front-end.
//!
//! Sends run on their own task so the input loop keeps reading: the user can
//! switch or delete conversations while a reply is pending.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use chowkidaar_assistant::{Assistant, Composer, DispatchOutcome, RejectReason};

use crate::commands::{Command, HELP};
use crate::render;

pub struct Repl {
    assistant: Arc<Assistant>,
    composer: Composer,
    suggestions: Vec<String>,
}

impl Repl {
    pub fn new(assistant: Arc<Assistant>) -> Self {
        Self {
            assistant,
            composer: Composer::new(),
            suggestions: Vec::new(),
        }
    }

    /// Run one command. Sends return the handle of their background task.
    pub async fn run(&mut self, command: Command) -> Option<JoinHandle<DispatchOutcome>> {
        let chat = self.assistant.chat();
        match command {
            Command::New => {
                chat.new_draft();
                println!("New conversation.");
            }
            Command::Sessions => {
                if let Err(e) = self.assistant.registry().refresh().await {
                    debug!(error = %e, "Showing the previous session list");
                }
                print!(
                    "{}",
                    render::session_list(&self.assistant.registry().sessions(), chat.active_session())
                );
            }
            Command::Open(id) => {
                if chat.select_session(id).await.is_ok() {
                    self.print_conversation();
                }
            }
            Command::Delete(id) => {
                if self.assistant.delete_session(id).await.is_ok() {
                    println!("Deleted conversation {id}.");
                }
            }
            Command::Find(query) => {
                let hits = self.assistant.registry().filter(&query);
                print!("{}", render::session_list(&hits, chat.active_session()));
            }
            Command::Suggest => {
                self.suggestions = self.assistant.suggestions().fetch().await;
                print!("{}", render::suggestions(&self.suggestions));
            }
            Command::Use(n) => match self.suggestions.get(n - 1) {
                Some(suggestion) => {
                    self.composer.apply_suggestion(suggestion);
                    println!("> {} (/send to ask)", self.composer.text());
                }
                None => eprintln!("No suggestion {n}; run /suggest first."),
            },
            Command::Send => {
                let text = self.composer.take();
                return Some(self.send(text));
            }
            Command::Say(text) => return Some(self.send(text)),
            Command::Help => println!("{HELP}"),
            Command::Quit => {}
        }
        None
    }

    fn send(&self, text: String) -> JoinHandle<DispatchOutcome> {
        let assistant = self.assistant.clone();
        tokio::spawn(async move {
            let outcome = assistant.chat().submit(&text).await;
            report(&assistant, &outcome);
            outcome
        })
    }

    fn print_conversation(&self) {
        let snapshot = self.assistant.chat().snapshot();
        if snapshot.messages.is_empty() {
            println!("(empty conversation)");
        }
        for message in &snapshot.messages {
            print!("{}", render::message(message, &self.assistant.context().media));
        }
    }
}

fn report(assistant: &Assistant, outcome: &DispatchOutcome) {
    match outcome {
        DispatchOutcome::Delivered {
            assistant: reply_id,
            promoted,
            related_events,
            ..
        } => {
            if let Some(session) = promoted {
                debug!(session = %session, "Conversation saved");
            }
            let snapshot = assistant.chat().snapshot();
            if let Some(reply) = snapshot.messages.iter().find(|m| m.id == *reply_id) {
                print!("{}", render::message(reply, &assistant.context().media));
            }
            if let Some(line) = render::related_events(related_events) {
                println!("{line}");
            }
        }
        DispatchOutcome::Rejected(RejectReason::EmptyInput) => {
            eprintln!("Nothing to send.");
        }
        DispatchOutcome::Rejected(RejectReason::SendInFlight) => {
            eprintln!("Still waiting for the previous reply.");
        }
        // Failures arrive as notices; stale replies are dropped silently.
        DispatchOutcome::RolledBack(_) | DispatchOutcome::Discarded => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use chowkidaar_assistant::AssistantContext;
    use chowkidaar_net::{ApiError, AssistantService, ClientConfig, Result, StaticToken};
    use chowkidaar_shared::{ChatReply, ChatRequest, SessionDetail, SessionId, SessionSummary};

    /// Holds every chat reply until released.
    #[derive(Default)]
    struct HeldReplies {
        release: Notify,
    }

    #[async_trait]
    impl AssistantService for HeldReplies {
        async fn list_sessions(&self, _limit: u32) -> Result<Vec<SessionSummary>> {
            Ok(Vec::new())
        }

        async fn get_session_detail(&self, _id: SessionId) -> Result<SessionDetail> {
            Err(ApiError::Status {
                status: 404,
                detail: "Session not found".into(),
            })
        }

        async fn send_message(&self, _request: &ChatRequest) -> Result<ChatReply> {
            self.release.notified().await;
            Ok(ChatReply {
                text: "Nobody came by.".into(),
                session_id: Some(SessionId(9)),
                related_event_ids: Vec::new(),
                related_events: None,
                dropped_events: 0,
            })
        }

        async fn delete_session(&self, _id: SessionId) -> Result<()> {
            Ok(())
        }

        async fn get_suggestions(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn repl(service: Arc<HeldReplies>) -> (Repl, Arc<Assistant>) {
        let context = AssistantContext::with_service(
            ClientConfig::default(),
            service,
            Arc::new(StaticToken::anonymous()),
        );
        let assistant = Arc::new(Assistant::new(context));
        (Repl::new(assistant.clone()), assistant)
    }

    #[tokio::test]
    async fn test_commands_run_while_a_reply_is_pending() {
        let service = Arc::new(HeldReplies::default());
        let (mut repl, assistant) = repl(service.clone());

        let pending = repl
            .run(Command::Say("anyone at the gate?".into()))
            .await
            .unwrap();
        while !assistant.chat().is_sending() {
            tokio::task::yield_now().await;
        }

        // A second send from the same view is refused, not queued.
        let second = repl.run(Command::Say("hello?".into())).await.unwrap();
        assert!(matches!(
            second.await.unwrap(),
            DispatchOutcome::Rejected(RejectReason::SendInFlight)
        ));

        // Switching is immediate; the late reply is dropped.
        assert!(repl.run(Command::New).await.is_none());
        assert!(!assistant.chat().is_sending());

        service.release.notify_one();
        assert!(matches!(pending.await.unwrap(), DispatchOutcome::Discarded));
        let snapshot = assistant.chat().snapshot();
        assert_eq!(snapshot.active_session, None);
        assert!(snapshot.messages.is_empty());
    }

    #[tokio::test]
    async fn test_reply_is_applied_when_view_unchanged() {
        let service = Arc::new(HeldReplies::default());
        let (mut repl, assistant) = repl(service.clone());
        service.release.notify_one();

        let handle = repl.run(Command::Say("status?".into())).await.unwrap();
        assert!(matches!(
            handle.await.unwrap(),
            DispatchOutcome::Delivered { .. }
        ));
        assert_eq!(assistant.chat().active_session(), Some(SessionId(9)));
        assert_eq!(assistant.chat().snapshot().messages.len(), 2);
    }
}

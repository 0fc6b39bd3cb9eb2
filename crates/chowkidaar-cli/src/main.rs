//! # chowkidaar
//!
//! Terminal front-end for the Chowkidaar security assistant.
//!
//! Talks to the assistant API configured through `CHOWKIDAAR_*` environment
//! variables: lists past conversations, opens and deletes them, and chats
//! with the assistant about recorded security events.

mod commands;
mod render;
mod repl;

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

use chowkidaar_assistant::{Assistant, AssistantContext, ViewEvent};
use chowkidaar_net::ClientConfig;
use chowkidaar_shared::constants::APP_NAME;

use crate::commands::Command;
use crate::repl::Repl;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    chowkidaar_assistant::init_tracing();
    info!("Starting {} assistant CLI v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    let config = ClientConfig::from_env();
    info!(?config, "Loaded configuration");

    let assistant = Arc::new(Assistant::new(AssistantContext::from_config(config)?));
    assistant.start().await;

    // Failures are reported asynchronously on the view channel.
    let mut events = assistant.chat().subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ViewEvent::Notice(notice)) => eprintln!("{}", render::notice(&notice)),
                Ok(event) => debug!(?event, "View event"),
                Err(RecvError::Lagged(missed)) => debug!(missed, "View events lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    println!("{APP_NAME} assistant. Type /help for commands.");
    print!("{}", render::session_list(&assistant.registry().sessions(), None));

    let mut repl = Repl::new(assistant);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match commands::parse(&line) {
                    Ok(Some(Command::Quit)) => break,
                    // Sends continue in the background; their handle is not needed.
                    Ok(Some(command)) => drop(repl.run(command).await),
                    Ok(None) => {}
                    Err(e) => eprintln!("{e}"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    Ok(())
}

//! Parsing of terminal input into front-end commands.

use thiserror::Error;

use chowkidaar_shared::SessionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start a fresh draft conversation.
    New,
    /// Refresh and list sessions.
    Sessions,
    Open(SessionId),
    Delete(SessionId),
    /// Filter the known sessions by title.
    Find(String),
    /// Fetch example prompts.
    Suggest,
    /// Put the n-th suggestion (1-based) in the compose input.
    Use(usize),
    /// Send whatever is in the compose input.
    Send,
    Help,
    Quit,
    /// Plain text: send it as a message.
    Say(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: /{0} (try /help)")]
    Unknown(String),

    #[error("/{command} needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    #[error("Not a valid session id: {0}")]
    InvalidSession(String),

    #[error("Not a valid suggestion number: {0}")]
    InvalidIndex(String),
}

pub const HELP: &str = "\
Commands:
  /new            start a new conversation
  /sessions       list recent conversations
  /open <id>      open a conversation
  /delete <id>    delete a conversation
  /find <text>    filter conversations by title
  /suggest        show example questions
  /use <n>        put suggestion n in the input
  /send           send the input
  /quit           exit
Anything else is sent to the assistant.";

/// Parse one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(Command::Say(line.to_string())));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let command = match name.to_lowercase().as_str() {
        "new" => Command::New,
        "sessions" | "ls" => Command::Sessions,
        "open" => Command::Open(session_arg("open", arg)?),
        "delete" | "rm" => Command::Delete(session_arg("delete", arg)?),
        "find" => {
            if arg.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "find",
                    what: "some text",
                });
            }
            Command::Find(arg.to_string())
        }
        "suggest" => Command::Suggest,
        "use" => {
            if arg.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "use",
                    what: "a suggestion number",
                });
            }
            match arg.parse::<usize>() {
                Ok(n) if n > 0 => Command::Use(n),
                _ => return Err(CommandError::InvalidIndex(arg.to_string())),
            }
        }
        "send" => Command::Send,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn session_arg(command: &'static str, arg: &str) -> Result<SessionId, CommandError> {
    if arg.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            what: "a session id",
        });
    }
    arg.parse::<SessionId>()
        .map_err(|_| CommandError::InvalidSession(arg.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_message() {
        assert_eq!(
            parse("  anyone at the back door?  ").unwrap(),
            Some(Command::Say("anyone at the back door?".into()))
        );
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn test_commands() {
        assert_eq!(parse("/new").unwrap(), Some(Command::New));
        assert_eq!(parse("/open 42").unwrap(), Some(Command::Open(SessionId(42))));
        assert_eq!(parse("/DELETE 7").unwrap(), Some(Command::Delete(SessionId(7))));
        assert_eq!(
            parse("/find project plan").unwrap(),
            Some(Command::Find("project plan".into()))
        );
        assert_eq!(parse("/use 2").unwrap(), Some(Command::Use(2)));
        assert_eq!(parse("/quit").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn test_bad_arguments() {
        assert!(matches!(
            parse("/open"),
            Err(CommandError::MissingArgument { command: "open", .. })
        ));
        assert!(matches!(parse("/open abc"), Err(CommandError::InvalidSession(_))));
        assert!(matches!(parse("/open 0"), Err(CommandError::InvalidSession(_))));
        assert!(matches!(parse("/use 0"), Err(CommandError::InvalidIndex(_))));
        assert!(matches!(parse("/frobnicate"), Err(CommandError::Unknown(_))));
    }
}

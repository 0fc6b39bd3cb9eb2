//! # chowkidaar-shared
//!
//! Identifiers, domain enums, wire schemas and constants shared by every
//! crate of the Chowkidaar assistant client.

pub mod constants;
pub mod error;
pub mod protocol;
pub mod timestamp;
pub mod types;

pub use error::ProtocolError;
pub use protocol::{
    ChatReply, ChatRequest, EvidenceRef, FrameRef, HistoryEntry, SessionDetail, SessionSummary,
};
pub use types::{EventId, MessageId, Role, SessionId, Severity};

//! Plain-text rendering of sessions, messages and evidence.

use std::fmt::Write as _;

use chowkidaar_assistant::{cards, EvidenceCard, ImageSource, Message, Notice};
use chowkidaar_net::MediaUrls;
use chowkidaar_shared::{EventId, Role, SessionId, SessionSummary};

pub fn session_list(sessions: &[SessionSummary], active: Option<SessionId>) -> String {
    if sessions.is_empty() {
        return "No conversations yet.".to_string();
    }
    let mut out = String::new();
    for session in sessions {
        let marker = if Some(session.id) == active { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{marker} {:>5}  {:<40}  {}",
            session.id.0,
            session.display_title(),
            session.updated_at.format("%Y-%m-%d %H:%M"),
        );
    }
    out
}

pub fn message(message: &Message, media: &MediaUrls) -> String {
    let who = match message.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    let mut out = format!(
        "[{}] {who}: {}\n",
        message.created_at.format("%H:%M"),
        message.content
    );
    if let Some(evidence) = &message.evidence {
        for card in cards(evidence, media) {
            out.push_str(&evidence_card(&card));
        }
    }
    out
}

pub fn evidence_card(card: &EvidenceCard) -> String {
    let record = &card.record;
    let mut out = format!(
        "    #{} {} [{}] {} at {}\n",
        record.id,
        record.event_type,
        record.severity,
        record.camera_name,
        record.timestamp.format("%Y-%m-%d %H:%M:%S"),
    );
    if let Some(summary) = &record.summary {
        let _ = writeln!(out, "      {summary}");
    }
    if !record.detected_objects.is_empty() {
        let _ = writeln!(out, "      objects: {}", record.detected_objects.join(", "));
    }
    match &card.image {
        ImageSource::Remote(url) => {
            let _ = writeln!(out, "      image: {url}");
        }
        ImageSource::Placeholder => out.push_str("      image: (none)\n"),
    }
    out
}

/// The events a reply was grounded on, if any.
pub fn related_events(ids: &[EventId]) -> Option<String> {
    if ids.is_empty() {
        return None;
    }
    let ids: Vec<String> = ids.iter().map(|id| format!("#{id}")).collect();
    Some(format!("    (based on events {})", ids.join(", ")))
}

pub fn suggestions(suggestions: &[String]) -> String {
    let mut out = String::new();
    for (i, suggestion) in suggestions.iter().enumerate() {
        let _ = writeln!(out, "  {}. {suggestion}", i + 1);
    }
    out
}

pub fn notice(notice: &Notice) -> String {
    format!("! {}", notice.message)
}

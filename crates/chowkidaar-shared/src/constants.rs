/// Application name
pub const APP_NAME: &str = "Chowkidaar";

/// Maximum number of evidence records attached to one assistant reply
pub const MAX_EVIDENCE_PER_REPLY: usize = 4;

/// Label shown (and matched by the local filter) for sessions without a title
pub const FALLBACK_SESSION_TITLE: &str = "New Chat";

/// Camera label used when the server omits the camera name of an event
pub const UNKNOWN_CAMERA: &str = "Unknown camera";

/// Default assistant API root
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Default request timeout in seconds. Replies go through a VLM and can be slow.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Number of sessions requested per registry refresh
pub const DEFAULT_SESSION_PAGE_SIZE: u32 = 20;

/// Prompts offered on the empty state when the server has none to suggest
pub const DEFAULT_SUGGESTIONS: &[&str] = &[
    "What happened in the last hour?",
    "Show me a summary of today's events",
    "Were there any critical incidents this week?",
];

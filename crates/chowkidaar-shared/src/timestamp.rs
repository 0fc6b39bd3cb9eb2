//! Lenient timestamp parsing.
//!
//! The API emits ISO-8601 timestamps that may or may not carry an offset
//! (`2024-05-01T10:00:00Z` vs `2024-05-01T10:00:00.123456`). Values without
//! an offset are UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::ProtocolError;

/// Parse an RFC 3339 or offset-less ISO-8601 timestamp.
pub fn parse(raw: &str) -> Result<DateTime<Utc>, ProtocolError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|_| ProtocolError::InvalidTimestamp(raw.to_string()))
}

/// `serde(deserialize_with)` adapter around [`parse`].
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(serde::de::Error::custom)
}

/// Like [`deserialize`] for optional fields.
pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse(&raw).map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_rfc3339() {
        let ts = parse("2024-05-01T10:00:00+02:00").unwrap();
        assert_eq!(ts.hour(), 8);
    }

    #[test]
    fn test_parse_naive_as_utc() {
        let ts = parse("2024-05-01T10:00:00.123456").unwrap();
        assert_eq!(ts.day(), 1);
        assert_eq!(ts.hour(), 10);
        assert_eq!(ts.timestamp_subsec_micros(), 123_456);
    }

    #[test]
    fn test_parse_space_separated() {
        assert!(parse("2024-05-01 10:00:00").is_ok());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse("yesterday"),
            Err(ProtocolError::InvalidTimestamp(_))
        ));
    }
}

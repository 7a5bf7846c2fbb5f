//! Expiry timestamp parsing and formatting
//!
//! Metadata carries `expires` as an RFC3339 string. Older repositories used
//! `YYYY-MM-DD HH:MM:SS MST`; those are accepted on ingest and interpreted
//! as UTC. Unparseable strings are not treated as expired — acceptance is
//! still gated by the signature threshold.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

const LEGACY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse an `expires` string, RFC3339 first, then the legacy form.
pub fn parse(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    if s.len() >= 19 {
        let (stamp, rest) = s.split_at(19);
        if rest.is_empty() || rest.starts_with(' ') {
            if let Ok(naive) = NaiveDateTime::parse_from_str(stamp, LEGACY_FORMAT) {
                return Some(naive.and_utc());
            }
        }
    }
    None
}

/// Whether the given `expires` string is in the past
pub fn is_expired(s: &str) -> bool {
    match parse(s) {
        Some(t) => t <= Utc::now(),
        None => false,
    }
}

/// Format a timestamp the way our constructors emit `expires`
pub fn format(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_parse_rfc3339() {
        let t = parse("2030-01-02T03:04:05Z").unwrap();
        assert_eq!(format(t), "2030-01-02T03:04:05Z");
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let t = parse("2030-01-02T03:04:05+02:00").unwrap();
        assert_eq!(format(t), "2030-01-02T01:04:05Z");
    }

    #[test]
    fn test_parse_legacy() {
        let t = parse("2030-01-02 03:04:05 MST").unwrap();
        assert_eq!(format(t), "2030-01-02T03:04:05Z");
        assert!(parse("2030-01-02 03:04:05").is_some());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse("not a time").is_none());
        assert!(parse("").is_none());
    }

    #[test]
    fn test_is_expired() {
        let past = format(Utc::now() - Duration::days(1));
        let future = format(Utc::now() + Duration::days(1));
        assert!(is_expired(&past));
        assert!(!is_expired(&future));
        assert!(!is_expired("unparseable"));
    }
}

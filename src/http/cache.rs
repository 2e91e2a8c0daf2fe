//! HTTP cache validation module
//!
//! Provides `ETag` / `Last-Modified` generation and conditional request handling.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Validators for one file, derived from its metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validators {
    pub etag: String,
    pub last_modified: String,
    /// Modification time truncated to whole seconds
    modified: SystemTime,
}

impl Validators {
    pub fn new(len: u64, modified: SystemTime) -> Self {
        let modified = truncate_to_seconds(modified);
        Self {
            etag: generate_etag(len, modified),
            last_modified: httpdate::fmt_http_date(modified),
            modified,
        }
    }

    /// Whether the request's conditional headers allow a 304.
    ///
    /// `If-Modified-Since` is only consulted when `If-None-Match` is absent.
    pub fn is_not_modified(
        &self,
        if_none_match: Option<&str>,
        if_modified_since: Option<&str>,
    ) -> bool {
        match if_none_match {
            Some(_) => check_etag_match(if_none_match, &self.etag),
            None => if_modified_since.is_some_and(|since| not_modified_since(since, self.modified)),
        }
    }
}

/// Generate `ETag` from file size and modification time
///
/// # Returns
/// Quoted `ETag` string, e.g., `"5-65a1b2c3"`
pub fn generate_etag(len: u64, modified: SystemTime) -> String {
    let secs = modified
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs();
    format!("\"{len:x}-{secs:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports:
/// - Single `ETag`: `"abc123"`
/// - Multiple `ETags`: `"abc123", "def456"`
/// - Weak comparison: `W/"abc123"`
/// - Wildcard: `*`
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag.split(',').any(|e| {
            let e = e.trim();
            e == "*" || e.strip_prefix("W/").unwrap_or(e) == etag
        })
    })
}

/// `If-Modified-Since` check; unparseable dates never match
fn not_modified_since(since: &str, modified: SystemTime) -> bool {
    httpdate::parse_http_date(since).is_ok_and(|client_time| modified <= client_time)
}

/// HTTP dates have one-second resolution
fn truncate_to_seconds(time: SystemTime) -> SystemTime {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs();
    UNIX_EPOCH + Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_generate_etag() {
        let etag = generate_etag(5, at(1_700_000_000));
        assert!(etag.starts_with('"'));
        assert!(etag.ends_with('"'));
        assert_eq!(etag, generate_etag(5, at(1_700_000_000)));
        assert_ne!(etag, generate_etag(6, at(1_700_000_000)));
        assert_ne!(etag, generate_etag(5, at(1_700_000_001)));
    }

    #[test]
    fn test_check_etag_match() {
        let etag = "\"abc123\"";
        assert!(check_etag_match(Some("\"abc123\""), etag));
        assert!(check_etag_match(Some("\"xyz\", \"abc123\""), etag));
        assert!(check_etag_match(Some("W/\"abc123\""), etag));
        assert!(check_etag_match(Some("*"), etag));
        assert!(!check_etag_match(Some("\"different\""), etag));
        assert!(!check_etag_match(None, etag));
    }

    #[test]
    fn test_subsecond_mtime_is_truncated() {
        let v = Validators::new(5, at(1_700_000_000) + Duration::from_millis(750));
        assert_eq!(v.last_modified, httpdate::fmt_http_date(at(1_700_000_000)));
        assert!(v.is_not_modified(None, Some(&v.last_modified)));
    }

    #[test]
    fn test_if_modified_since() {
        let v = Validators::new(5, at(1_700_000_000));
        let later = httpdate::fmt_http_date(at(1_700_000_100));
        let earlier = httpdate::fmt_http_date(at(1_699_999_000));

        assert!(v.is_not_modified(None, Some(&later)));
        assert!(!v.is_not_modified(None, Some(&earlier)));
        assert!(!v.is_not_modified(None, Some("not a date")));
        assert!(!v.is_not_modified(None, None));
    }

    #[test]
    fn test_if_none_match_takes_precedence() {
        let v = Validators::new(5, at(1_700_000_000));
        let later = httpdate::fmt_http_date(at(1_700_000_100));

        assert!(!v.is_not_modified(Some("\"other\""), Some(&later)));
        assert!(v.is_not_modified(Some(&v.etag), None));
    }
}

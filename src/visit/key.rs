//! Visit key encoding
//!
//! Visit documents are keyed `visit/<timestamp>/<nonce>` where the timestamp
//! is zero-padded to a fixed width, so lexicographic key order equals
//! chronological order. The store has no index on visit time; every
//! temporal query is a key-range query built from these helpers.

use serde_json::Value;
use uuid::Uuid;

use crate::search::{SearchError, SearchResult};

/// Prefix shared by all visit keys
pub const VISIT_KEY_PREFIX: &str = "visit/";

/// Width of the zero-padded timestamp segment
const TIMESTAMP_WIDTH: usize = 16;

/// Largest timestamp that fits the padded segment
pub const MAX_TIMESTAMP: i64 = 9_999_999_999_999_999;

/// Largest suffix character, used to build inclusive upper bounds
const MAX_SUFFIX: char = '\u{ffff}';

/// A parsed visit key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VisitKey {
    timestamp: i64,
    nonce: String,
}

impl VisitKey {
    /// Creates a key from a timestamp and an explicit nonce
    pub fn new(timestamp: i64, nonce: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.clamp(0, MAX_TIMESTAMP),
            nonce: nonce.into(),
        }
    }

    /// Creates a key with a fresh random nonce
    pub fn generate(timestamp: i64) -> Self {
        Self::new(timestamp, Uuid::new_v4().simple().to_string())
    }

    /// Parses a key string.
    ///
    /// Returns None if the string is not in the visit namespace or the
    /// timestamp segment is not a number.
    pub fn parse(key: &str) -> Option<Self> {
        let rest = key.strip_prefix(VISIT_KEY_PREFIX)?;
        let (ts, nonce) = rest.split_once('/')?;
        if ts.len() != TIMESTAMP_WIDTH || !ts.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let timestamp = ts.parse::<i64>().ok()?;
        Some(Self::new(timestamp, nonce))
    }

    /// Smallest possible key for the given timestamp.
    ///
    /// Sorts before every visit recorded in that millisecond.
    pub fn lower_bound(timestamp: i64) -> String {
        format!("{}{}/", VISIT_KEY_PREFIX, pad(timestamp))
    }

    /// Largest possible key for the given timestamp.
    ///
    /// Sorts after every visit recorded in that millisecond.
    pub fn upper_bound(timestamp: i64) -> String {
        format!("{}{}/{}", VISIT_KEY_PREFIX, pad(timestamp), MAX_SUFFIX)
    }

    /// Upper sentinel of the whole visit namespace
    pub fn namespace_end() -> String {
        format!("{}{}", VISIT_KEY_PREFIX, MAX_SUFFIX)
    }

    /// Returns the encoded timestamp (ms since epoch)
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Returns the nonce segment
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// Returns the encoded key string
    pub fn encode(&self) -> String {
        format!("{}{}/{}", VISIT_KEY_PREFIX, pad(self.timestamp), self.nonce)
    }
}

impl std::fmt::Display for VisitKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encode())
    }
}

fn pad(timestamp: i64) -> String {
    format!(
        "{:0width$}",
        timestamp.clamp(0, MAX_TIMESTAMP),
        width = TIMESTAMP_WIDTH
    )
}

/// Encodes a timestamp as the lowest visit key of that millisecond.
pub fn encode_visit_key(timestamp: i64) -> String {
    VisitKey::lower_bound(timestamp)
}

/// Extracts the visit timestamp from a visit document's `_id`.
pub fn extract_timestamp(doc: &Value) -> SearchResult<i64> {
    let id = doc
        .get("_id")
        .and_then(Value::as_str)
        .ok_or_else(|| SearchError::MalformedVisitKey("<missing _id>".to_string()))?;
    VisitKey::parse(id)
        .map(|key| key.timestamp())
        .ok_or_else(|| SearchError::MalformedVisitKey(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_roundtrip() {
        let key = VisitKey::new(1_500_000_000_000, "abc");
        assert_eq!(key.encode(), "visit/0001500000000000/abc");
        assert_eq!(VisitKey::parse(&key.encode()), Some(key));
    }

    #[test]
    fn test_lexicographic_order_follows_time() {
        let early = VisitKey::new(99, "zzz").encode();
        let late = VisitKey::new(100, "aaa").encode();
        assert!(early < late);
    }

    #[test]
    fn test_bounds_enclose_same_millisecond() {
        let key = VisitKey::new(300, "f00").encode();
        assert!(VisitKey::lower_bound(300) < key);
        assert!(key < VisitKey::upper_bound(300));
        assert!(VisitKey::upper_bound(299) < VisitKey::lower_bound(300));
    }

    #[test]
    fn test_namespace_end_above_all_visits() {
        let key = VisitKey::new(i64::MAX, "x").encode();
        assert_eq!(VisitKey::parse(&key).unwrap().timestamp(), MAX_TIMESTAMP);
        assert!(key < VisitKey::namespace_end());
        assert!(VISIT_KEY_PREFIX < key.as_str());
    }

    #[test]
    fn test_generated_keys_are_unique() {
        let a = VisitKey::generate(42);
        let b = VisitKey::generate(42);
        assert_ne!(a, b);
        assert_eq!(a.timestamp(), 42);
    }

    #[test]
    fn test_parse_rejects_foreign_keys() {
        assert!(VisitKey::parse("page/abc").is_none());
        assert!(VisitKey::parse("visit/12/abc").is_none());
        assert!(VisitKey::parse("visit/00000000000000ab/abc").is_none());
    }

    #[test]
    fn test_extract_timestamp() {
        let doc = json!({"_id": VisitKey::new(1234, "n").encode()});
        assert_eq!(extract_timestamp(&doc).unwrap(), 1234);

        let bad = json!({"_id": "page/1"});
        assert!(matches!(
            extract_timestamp(&bad),
            Err(SearchError::MalformedVisitKey(_))
        ));
    }
}

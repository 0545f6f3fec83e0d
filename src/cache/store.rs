//! In-memory store mapping cache keys to response payloads
//!
//! Provides a `CacheStore` owned exclusively by one client instance, plus the
//! key derivation used to index it. Values are only ever written on the
//! success path of a network call, so an entry's payload always came from a
//! completed request.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// A single cached response payload
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The raw response body returned by the network call
    pub value: String,
    /// When the network call that produced `value` completed successfully
    pub stored_at: DateTime<Utc>,
}

/// In-memory mapping from cache key to cached response
///
/// Each client instance owns its own store; stores are never shared across
/// instances. All operations are total: lookups on absent keys return `None`
/// and evictions of absent keys are no-ops.
#[derive(Debug, Default)]
pub struct CacheStore {
    entries: HashMap<String, CacheEntry>,
}

impl CacheStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Read-only probe for the entry under `key`
    pub fn lookup(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Inserts or overwrites the entry for `key`, stamping it with the
    /// current time
    ///
    /// Latest write wins; there is no versioning.
    pub fn put(&mut self, key: String, value: String) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Utc::now(),
            },
        );
    }

    /// Removes the entry for `key` if present; no-op if absent
    pub fn evict(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Returns the number of entries currently in the store
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the store contains no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrites an entry's timestamp, for tests that need to age entries
    /// without sleeping
    #[cfg(test)]
    pub(crate) fn backdate(&mut self, key: &str, stored_at: DateTime<Utc>) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.stored_at = stored_at;
        }
    }
}

/// Derives the cache key for a request
///
/// A request without a body (GET) is keyed by its URL verbatim. A request
/// with a body (POST) is keyed by the URL concatenated with the body's
/// canonical JSON serialization: `serde_json::Value` keeps object keys
/// ordered, so two bodies that are equal field-for-field produce the same
/// key regardless of the order fields were written in. A `null` or
/// empty-string body is treated the same as no body.
///
/// GET and POST to the same URL can never collide: only a non-empty body
/// appends anything to the URL.
pub fn cache_key(url: &str, body: Option<&Value>) -> String {
    match body {
        None | Some(Value::Null) => url.to_string(),
        Some(Value::String(s)) if s.is_empty() => url.to_string(),
        Some(body) => format!("{}{}", url, body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn test_cache_key_get_is_url_verbatim() {
        assert_eq!(cache_key("http://api/x", None), "http://api/x");
    }

    #[test]
    fn test_cache_key_null_body_is_url_verbatim() {
        assert_eq!(cache_key("http://api/x", Some(&Value::Null)), "http://api/x");
    }

    #[test]
    fn test_cache_key_empty_string_body_is_url_verbatim() {
        let body = json!("");
        assert_eq!(cache_key("http://api/x", Some(&body)), "http://api/x");
    }

    #[test]
    fn test_cache_key_appends_serialized_body() {
        let body = json!({"a": 1});
        assert_eq!(
            cache_key("http://api/x", Some(&body)),
            "http://api/x{\"a\":1}"
        );
    }

    #[test]
    fn test_cache_key_distinct_bodies_distinct_keys() {
        let body_a = json!({"a": 1});
        let body_b = json!({"a": 2});
        assert_ne!(
            cache_key("http://api/x", Some(&body_a)),
            cache_key("http://api/x", Some(&body_b))
        );
    }

    #[test]
    fn test_cache_key_deterministic_for_equal_bodies() {
        let body_a = json!({"a": 1, "b": 2});
        let body_b = json!({"a": 1, "b": 2});
        assert_eq!(
            cache_key("http://api/x", Some(&body_a)),
            cache_key("http://api/x", Some(&body_b))
        );
    }

    #[test]
    fn test_cache_key_canonicalizes_field_order() {
        // serde_json's ordered map sorts object keys, so the same fields
        // written in a different order serialize identically.
        let body_a = json!({"b": 2, "a": 1});
        let body_b = json!({"a": 1, "b": 2});
        assert_eq!(
            cache_key("http://api/x", Some(&body_a)),
            cache_key("http://api/x", Some(&body_b))
        );
    }

    #[test]
    fn test_cache_key_get_never_collides_with_post() {
        let body = json!({"a": 1});
        assert_ne!(
            cache_key("http://api/x", None),
            cache_key("http://api/x", Some(&body))
        );
    }

    #[test]
    fn test_lookup_returns_none_for_missing_key() {
        let store = CacheStore::new();
        assert!(store.lookup("http://api/x").is_none());
    }

    #[test]
    fn test_put_then_lookup_returns_value() {
        let mut store = CacheStore::new();
        store.put("http://api/x".to_string(), "payload".to_string());

        let entry = store.lookup("http://api/x").expect("entry should exist");
        assert_eq!(entry.value, "payload");
    }

    #[test]
    fn test_put_stamps_current_time() {
        let mut store = CacheStore::new();

        let before = Utc::now();
        store.put("http://api/x".to_string(), "payload".to_string());
        let after = Utc::now();

        let entry = store.lookup("http://api/x").expect("entry should exist");
        assert!(entry.stored_at >= before, "stored_at should be after put started");
        assert!(entry.stored_at <= after, "stored_at should be before put finished");
    }

    #[test]
    fn test_put_overwrites_in_place() {
        let mut store = CacheStore::new();
        store.put("http://api/x".to_string(), "first".to_string());
        let first_stored_at = store.lookup("http://api/x").unwrap().stored_at;

        store.put("http://api/x".to_string(), "second".to_string());

        let entry = store.lookup("http://api/x").expect("entry should exist");
        assert_eq!(entry.value, "second", "latest write should win");
        assert!(entry.stored_at >= first_stored_at, "timestamp should advance");
        assert_eq!(store.len(), 1, "overwrite should not grow the store");
    }

    #[test]
    fn test_evict_removes_entry() {
        let mut store = CacheStore::new();
        store.put("http://api/x".to_string(), "payload".to_string());

        store.evict("http://api/x");

        assert!(store.lookup("http://api/x").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_evict_absent_key_is_noop() {
        let mut store = CacheStore::new();
        store.put("http://api/x".to_string(), "payload".to_string());

        store.evict("http://api/y");

        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_backdate_rewrites_timestamp() {
        let mut store = CacheStore::new();
        store.put("http://api/x".to_string(), "payload".to_string());

        let past = Utc::now() - Duration::minutes(5);
        store.backdate("http://api/x", past);

        assert_eq!(store.lookup("http://api/x").unwrap().stored_at, past);
    }
}

//! In-memory TTL cache.
//!
//! A thin generic layer over `DashMap` with per-entry deadlines and lazy
//! expiry: stale entries are evicted on the read that observes them, there is
//! no background sweeper. All operations are infallible; the cache degrades
//! to a miss rather than surfacing an error.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use log::debug;

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Concurrent cache with a time-to-live per entry.
pub struct TtlCache<V: Clone> {
    entries: DashMap<String, CacheEntry<V>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Returns the cached value if present and not expired. Expired entries
    /// are removed on observation.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) if now < entry.expires_at => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
            debug!("Cache entry expired: {}", key);
        }
        None
    }

    /// Stores a value under `key` for `ttl`, replacing any previous entry.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) -> bool {
        self.set_at(key, value, ttl, Instant::now())
    }

    fn set_at(&self, key: impl Into<String>, value: V, ttl: Duration, now: Instant) -> bool {
        self.entries.insert(
            key.into(),
            CacheEntry {
                value,
                expires_at: now + ttl,
            },
        );
        true
    }

    /// Removes a single entry. Returns whether anything was removed.
    pub fn delete(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drops every entry.
    pub fn clear(&self) -> bool {
        self.entries.clear();
        true
    }

    /// Number of entries currently stored, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a deterministic composite cache key from an operation name and its
/// parameters, so logically identical requests map to the same entry.
pub fn cache_key(operation: &str, parts: &[&str]) -> String {
    let mut key = String::with_capacity(operation.len() + parts.len() * 8);
    key.push_str(operation);
    for part in parts {
        key.push(':');
        key.push_str(part);
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let cache: TtlCache<String> = TtlCache::new();
        assert!(cache.set("quote:PETR4.SA", "payload".to_string(), Duration::from_secs(120)));
        assert_eq!(cache.get("quote:PETR4.SA"), Some("payload".to_string()));
    }

    #[test]
    fn test_miss_on_absent_key() {
        let cache: TtlCache<String> = TtlCache::new();
        assert_eq!(cache.get("quote:VALE3.SA"), None);
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let cache: TtlCache<u32> = TtlCache::new();
        let start = Instant::now();
        cache.set_at("k", 7, Duration::from_secs(120), start);

        assert_eq!(cache.get_at("k", start + Duration::from_secs(119)), Some(7));
        assert_eq!(cache.get_at("k", start + Duration::from_secs(121)), None);
        // Expired entry was evicted by the read.
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_set_replaces_value_and_deadline() {
        let cache: TtlCache<u32> = TtlCache::new();
        let start = Instant::now();
        cache.set_at("k", 1, Duration::from_secs(10), start);
        cache.set_at("k", 2, Duration::from_secs(120), start + Duration::from_secs(5));

        assert_eq!(cache.get_at("k", start + Duration::from_secs(60)), Some(2));
    }

    #[test]
    fn test_delete_and_clear() {
        let cache: TtlCache<u32> = TtlCache::new();
        cache.set("a", 1, Duration::from_secs(60));
        cache.set("b", 2, Duration::from_secs(60));

        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));
        assert!(cache.clear());
        assert!(cache.is_empty());
        // Clearing an empty cache is still a success.
        assert!(cache.clear());
    }

    #[test]
    fn test_cache_key_composition() {
        assert_eq!(
            cache_key("quote", &["PETR4.SA", "1mo", "1d"]),
            "quote:PETR4.SA:1mo:1d"
        );
        assert_eq!(cache_key("trending", &["B3"]), "trending:B3");
    }
}

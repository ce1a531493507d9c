//! Explicit query cache for API responses.
//!
//! A key -> JSON-snapshot map with two staleness mechanisms: manual
//! prefix invalidation, called by mutating endpoint methods for the
//! entity they touched, and TTL expiry for read-only aggregate
//! queries. All access goes through a `std::sync::Mutex`; the lock is
//! never held across an await point.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// TTL for read-only aggregate queries (time series, distributions,
/// latest indices, risk assessments).
pub const AGGREGATE_TTL: Duration = Duration::from_secs(30);

struct CacheEntry {
    value: serde_json::Value,
    inserted_at: Instant,
}

/// In-memory response cache keyed by request path + parameters.
#[derive(Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a cached value if present and fresh.
    ///
    /// `ttl: None` means the entry stays fresh until explicitly
    /// invalidated (entity reads); `Some(ttl)` adds time-based
    /// staleness (aggregate reads). Entries that fail to deserialize
    /// are treated as absent.
    pub fn get_fresh<T: DeserializeOwned>(&self, key: &str, ttl: Option<Duration>) -> Option<T> {
        let entries = self.entries.lock().expect("query cache lock poisoned");
        let entry = entries.get(key)?;
        if let Some(ttl) = ttl {
            if entry.inserted_at.elapsed() > ttl {
                return None;
            }
        }
        serde_json::from_value(entry.value.clone()).ok()
    }

    /// Store a response snapshot under a key, replacing any prior entry.
    pub fn insert<T: Serialize>(&self, key: &str, value: &T) {
        let Ok(value) = serde_json::to_value(value) else {
            return;
        };
        let mut entries = self.entries.lock().expect("query cache lock poisoned");
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop every entry whose key starts with `prefix`. Returns the
    /// number of entries removed.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.lock().expect("query cache lock poisoned");
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        before - entries.len()
    }

    /// Drop everything.
    pub fn clear(&self) {
        self.entries
            .lock()
            .expect("query cache lock poisoned")
            .clear();
    }

    /// Number of cached entries (stale ones included).
    pub fn len(&self) -> usize {
        self.entries.lock().expect("query cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get() {
        let cache = QueryCache::new();
        cache.insert("/farms", &vec!["a".to_string(), "b".to_string()]);
        let hit: Option<Vec<String>> = cache.get_fresh("/farms", None);
        assert_eq!(hit, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn miss_on_absent_key() {
        let cache = QueryCache::new();
        let hit: Option<Vec<String>> = cache.get_fresh("/farms", None);
        assert!(hit.is_none());
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let cache = QueryCache::new();
        cache.insert("/indices/latest/x", &42u32);
        // A zero TTL is already elapsed by the time we read.
        std::thread::sleep(Duration::from_millis(2));
        let hit: Option<u32> = cache.get_fresh("/indices/latest/x", Some(Duration::ZERO));
        assert!(hit.is_none());
    }

    #[test]
    fn generous_ttl_still_fresh() {
        let cache = QueryCache::new();
        cache.insert("/indices/latest/x", &42u32);
        let hit: Option<u32> = cache.get_fresh("/indices/latest/x", Some(AGGREGATE_TTL));
        assert_eq!(hit, Some(42));
    }

    #[test]
    fn prefix_invalidation_removes_matching_keys() {
        let cache = QueryCache::new();
        cache.insert("/farms?search=wheat", &1u32);
        cache.insert("/farms/abc", &2u32);
        cache.insert("/indices/latest/abc", &3u32);

        assert_eq!(cache.invalidate_prefix("/farms"), 2);
        assert_eq!(cache.len(), 1);
        let survivor: Option<u32> = cache.get_fresh("/indices/latest/abc", None);
        assert_eq!(survivor, Some(3));
    }

    #[test]
    fn insert_replaces_existing_entry() {
        let cache = QueryCache::new();
        cache.insert("/farms/abc", &1u32);
        cache.insert("/farms/abc", &2u32);
        let hit: Option<u32> = cache.get_fresh("/farms/abc", None);
        assert_eq!(hit, Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = QueryCache::new();
        cache.insert("/farms", &1u32);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn type_mismatch_is_a_miss() {
        let cache = QueryCache::new();
        cache.insert("/farms", &"not a number".to_string());
        let hit: Option<u32> = cache.get_fresh("/farms", None);
        assert!(hit.is_none());
    }
}

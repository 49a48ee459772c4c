//! Result caching.
//!
//! The cache is keyed by call parameters and consulted before an attempt
//! runs, written only after a fully successful call; no partial or failed
//! result is ever cached. Values are serialized JSON so the cache stays
//! agnostic of provider result shapes.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::CACHE_DEFAULT_TTL;

/// Read-before-attempt / write-after-success cache interface.
pub trait ResultCache: Send + Sync {
    /// Returns the cached value for `key`, if present and not expired.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, with an optional TTL override.
    fn set(&self, key: &str, value: String, ttl_override: Option<Duration>);
}

struct CacheEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Process-local cache with TTL expiry.
///
/// Expired entries are pruned lazily on access. Suitable for a single
/// process; a shared store behind the same trait replaces it in
/// multi-instance deployments.
pub struct MemoryCache {
    default_ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    /// Creates a cache with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        MemoryCache {
            default_ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a cache with the library default TTL.
    pub fn with_default_ttl() -> Self {
        Self::new(CACHE_DEFAULT_TTL)
    }

    /// Number of live (non-expired) entries.
    pub fn len(&self) -> usize {
        let now = Utc::now();
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    /// Whether the cache holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        match entries.get(key) {
            Some(entry) if entry.expires_at > Utc::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: String, ttl_override: Option<Duration>) {
        let ttl = ttl_override.unwrap_or(self.default_ttl);
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::hours(6));
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Utc::now() + ttl,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_miss() {
        let cache = MemoryCache::with_default_ttl();
        assert_eq!(cache.get("absent"), None);
    }

    #[test]
    fn test_set_then_get() {
        let cache = MemoryCache::with_default_ttl();
        cache.set("k", "v".to_string(), None);
        assert_eq!(cache.get("k").as_deref(), Some("v"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expired_entry_not_returned() {
        let cache = MemoryCache::new(Duration::from_secs(0));
        cache.set("k", "v".to_string(), None);
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_ttl_override_beats_default() {
        let cache = MemoryCache::new(Duration::from_secs(0));
        cache.set("k", "v".to_string(), Some(Duration::from_secs(60)));
        assert_eq!(cache.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let cache = MemoryCache::with_default_ttl();
        cache.set("k", "old".to_string(), None);
        cache.set("k", "new".to_string(), None);
        assert_eq!(cache.get("k").as_deref(), Some("new"));
        assert_eq!(cache.len(), 1);
    }
}

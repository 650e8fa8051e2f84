//! In-memory, string-keyed result cache with per-entry TTL.
//!
//! Used to memoize short-lived derived reads (per-member daily point totals,
//! leaderboard snapshots) so repeated requests inside a small window don't
//! refetch from the database. Entries are evicted lazily on lookup; there is
//! no background sweep and no size bound.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::constants::cache::DEFAULT_TTL;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Process-local TTL cache. Construct one per payload type and share it via
/// the application state; never a module-level global, so tests can build
/// isolated instances.
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TtlCache<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Stores `value` under `key` with the default TTL (300s), replacing any
    /// existing entry. Last write wins.
    pub fn set(&self, key: &str, value: V) {
        self.set_with_ttl(key, value, DEFAULT_TTL);
    }

    pub fn set_with_ttl(&self, key: &str, value: V, ttl: Duration) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .insert(key.to_string(), entry);
    }

    /// Returns true if a live entry exists for `key`. An expired entry is
    /// removed and reported absent.
    pub fn has(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => true,
            Some(_) => {
                entries.remove(key);
                false
            }
            None => false,
        }
    }

    pub fn clear(&self, key: &str) {
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .remove(key);
    }

    pub fn clear_all(&self) {
        self.entries.lock().expect("cache lock poisoned").clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> TtlCache<V> {
    /// Returns the stored value if its expiry has not passed. The freshness
    /// check runs on every read; an expired entry is deleted and `None` is
    /// returned.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Fetches from the cache, or computes `fill` and stores the result
    /// under `key` with `ttl`.
    pub async fn get_or_insert_with<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        fill: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }

        let value = fill().await?;
        self.set_with_ttl(key, value.clone(), ttl);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get_returns_value() {
        let cache = TtlCache::new();
        cache.set("k", "v".to_string());
        assert_eq!(cache.get("k"), Some("v".to_string()));
        assert!(cache.has("k"));
    }

    #[test]
    fn test_expired_entry_is_absent_and_evicted() {
        let cache = TtlCache::new();
        cache.set_with_ttl("k", "v".to_string(), Duration::from_millis(50));
        assert_eq!(cache.get("k"), Some("v".to_string()));

        std::thread::sleep(Duration::from_millis(80));
        assert_eq!(cache.get("k"), None);
        assert!(!cache.has("k"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_has_evicts_expired_entries() {
        let cache = TtlCache::new();
        cache.set_with_ttl("k", 1_i64, Duration::from_millis(10));
        std::thread::sleep(Duration::from_millis(30));
        assert!(!cache.has("k"));
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_overwrite_is_last_write_wins() {
        let cache = TtlCache::new();
        cache.set("k", "first".to_string());
        cache.set("k", "second".to_string());
        assert_eq!(cache.get("k"), Some("second".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_and_clear_all() {
        let cache = TtlCache::new();
        cache.set("a", 1_i64);
        cache.set("b", 2_i64);

        cache.clear("a");
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));

        cache.clear_all();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_access_does_not_corrupt() {
        use std::sync::Arc;

        let cache = Arc::new(TtlCache::new());
        let mut handles = vec![];

        for t in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(std::thread::spawn(move || {
                for i in 0..100 {
                    let key = format!("k{}", i % 10);
                    cache.set(&key, t * 1000 + i);
                    let _ = cache.get(&key);
                    let _ = cache.has(&key);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= 10);
    }

    #[tokio::test]
    async fn test_get_or_insert_with_fills_once_within_ttl() {
        let cache: TtlCache<i64> = TtlCache::new();

        let v = cache
            .get_or_insert_with("k", Duration::from_secs(60), || async {
                Ok::<_, std::convert::Infallible>(42)
            })
            .await
            .unwrap();
        assert_eq!(v, 42);

        // Second call must hit the cache, never the fill closure.
        let v = cache
            .get_or_insert_with("k", Duration::from_secs(60), || async {
                Ok::<_, std::convert::Infallible>(panic!("fill ran on a warm cache"))
            })
            .await
            .unwrap();
        assert_eq!(v, 42);
    }
}

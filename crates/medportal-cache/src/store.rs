//! In-memory TTL store for API read results.
//!
//! ## Expiry
//!
//! An entry is valid while `now - stored_at <= ttl`. Expired entries are not
//! swept in the background; they are removed when a read finds them stale,
//! or by an explicit [`ApiCache::purge_expired`].
//!
//! ## Sharing
//!
//! The store is an ordinary value: construct one, wrap it in `Arc`, and hand
//! it to the service wrappers that need it. All operations are synchronous
//! and thread-safe except the two async wrappers, which only await the
//! caller's own future.
//!
//! ## Ordering
//!
//! Invalidate only after a write's response has been observed, otherwise a
//! read started before the write can repopulate the cache with stale data.
//! [`ApiCache::invalidate_after`] encodes that order.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;

use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::ttl::ttl_millis;

/// TTL used when `set` is called without one (30 000 ms).
pub const DEFAULT_TTL: Duration = Duration::from_millis(30_000);

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries currently in the cache (including stale ones not
    /// yet evicted).
    pub size: usize,
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of entries evicted due to TTL expiration.
    pub evictions: u64,
    /// Number of entries removed by invalidation.
    pub invalidations: u64,
}

impl CacheStats {
    /// Calculate hit rate as a percentage.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Cached payload with its creation time and lifetime.
#[derive(Debug, Clone)]
struct CacheEntry {
    /// Payload wrapped in Arc so hits are cheap to hand out.
    data: Arc<Value>,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) > self.ttl
    }
}

/// TTL read-cache keyed by request (see [`cache_key`](crate::cache_key)).
pub struct ApiCache {
    entries: DashMap<String, CacheEntry>,
    default_ttl: Duration,
    enabled: bool,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    invalidations: AtomicU64,
}

impl std::fmt::Debug for ApiCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCache")
            .field("size", &self.entries.len())
            .field("default_ttl", &self.default_ttl)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl Default for ApiCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ApiCache {
    /// Create an enabled cache using wall-clock time.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use medportal_cache::ApiCache;
    /// use serde_json::json;
    ///
    /// let cache = ApiCache::new(Duration::from_secs(30));
    /// cache.set("/staff", json!([{"id": 1}]), None);
    /// assert!(cache.has("/staff"));
    /// ```
    #[must_use]
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
            enabled: true,
            clock: Arc::new(SystemClock),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
        }
    }

    /// A cache that stores nothing; every read misses.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            enabled: config.enabled,
            ..Self::new(config.default_ttl)
        }
    }

    /// Replace the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the payload for `key` if present and not expired.
    ///
    /// A stale entry is removed as part of the lookup. Hits never refresh
    /// the entry's timestamp.
    pub fn get(&self, key: &str) -> Option<Arc<Value>> {
        let now = self.clock.now();

        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(key, "cache hit");
                return Some(Arc::clone(&entry.data));
            }
            drop(entry);
            // A concurrent `set` may have replaced the entry meanwhile.
            if self
                .entries
                .remove_if(key, |_, entry| entry.is_expired(now))
                .is_some()
            {
                self.evictions.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key, "cache entry expired");
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(key, "cache miss");
        None
    }

    /// Stores `data` under `key`, replacing any previous entry.
    ///
    /// `ttl` defaults to the cache's default TTL.
    pub fn set(&self, key: impl Into<String>, data: Value, ttl: Option<Duration>) {
        self.insert_entry(key.into(), Arc::new(data), ttl);
    }

    fn insert_entry(&self, key: String, data: Arc<Value>, ttl: Option<Duration>) {
        if !self.enabled {
            return;
        }
        let ttl = ttl.unwrap_or(self.default_ttl);
        tracing::trace!(key = %key, ttl_ms = ttl_millis(ttl), "cache set");
        self.entries.insert(
            key,
            CacheEntry {
                data,
                stored_at: self.clock.now(),
                ttl,
            },
        );
    }

    /// Same as `get(key).is_some()`, including the eviction of a stale entry.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Removes entries by pattern.
    ///
    /// `None` removes everything. `Some(pattern)` removes every entry whose
    /// key contains `pattern` as a plain substring. Returns the number of
    /// removed entries.
    pub fn invalidate(&self, pattern: Option<&str>) -> usize {
        let removed = match pattern {
            None => {
                let removed = self.entries.len();
                self.entries.clear();
                removed
            }
            Some(pattern) => {
                let mut removed = 0;
                self.entries.retain(|key, _| {
                    if key.contains(pattern) {
                        removed += 1;
                        false
                    } else {
                        true
                    }
                });
                removed
            }
        };

        if removed > 0 {
            self.invalidations.fetch_add(removed as u64, Ordering::Relaxed);
        }
        tracing::debug!(pattern = pattern.unwrap_or("*"), removed, "cache invalidated");
        removed
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.invalidate(None);
    }

    /// Drops all expired entries. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;

        self.entries.retain(|_, entry| {
            if entry.is_expired(now) {
                removed += 1;
                false
            } else {
                true
            }
        });

        if removed > 0 {
            self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
        }

        removed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics for monitoring.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }

    /// Read-through helper for service read wrappers.
    ///
    /// Returns the cached payload on a hit. On a miss awaits `fetch`, caches
    /// a successful result under `key` with `ttl`, and returns it. Errors are
    /// passed through and never cached.
    ///
    /// # Errors
    ///
    /// Returns whatever error `fetch` produced.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        fetch: F,
    ) -> Result<Arc<Value>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }

        let data = Arc::new(fetch().await?);
        self.insert_entry(key.to_string(), Arc::clone(&data), ttl);
        Ok(data)
    }

    /// Runs a write and, once its response has arrived, invalidates `pattern`.
    ///
    /// Failed writes leave the cache untouched.
    ///
    /// # Errors
    ///
    /// Returns whatever error `write` produced.
    pub async fn invalidate_after<Fut, T, E>(&self, pattern: &str, write: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let response = write.await?;
        self.invalidate(Some(pattern));
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use serde_json::json;

    fn cache_with_clock() -> (ApiCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = ApiCache::default().with_clock(clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_set_then_get() {
        let (cache, _) = cache_with_clock();
        cache.set("k", json!({"v": 1}), Some(Duration::from_millis(10)));
        assert_eq!(cache.get("k").as_deref(), Some(&json!({"v": 1})));
    }

    #[test]
    fn test_expiry_after_ttl() {
        let (cache, clock) = cache_with_clock();
        cache.set("k", json!("v"), Some(Duration::from_millis(10)));

        clock.advance(Duration::from_millis(10));
        assert!(cache.get("k").is_some(), "valid at exactly ttl");

        clock.advance(Duration::from_millis(1));
        assert!(cache.get("k").is_none());
        assert!(!cache.has("k"));
        assert!(cache.is_empty(), "expired entry is evicted on read");
    }

    #[test]
    fn test_default_ttl_applies() {
        let (cache, clock) = cache_with_clock();
        cache.set("k", json!(1), None);

        clock.advance(Duration::from_millis(30_000));
        assert!(cache.has("k"));

        clock.advance(Duration::from_millis(1));
        assert!(!cache.has("k"));
    }

    #[test]
    fn test_repeated_gets_do_not_extend_lifetime() {
        let (cache, clock) = cache_with_clock();
        cache.set("k", json!([1, 2, 3]), Some(Duration::from_millis(100)));

        let first = cache.get("k").unwrap();
        for _ in 0..5 {
            clock.advance(Duration::from_millis(20));
            let again = cache.get("k").unwrap();
            assert_eq!(again, first);
        }
        clock.advance(Duration::from_millis(1));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_set_overwrites_and_restamps() {
        let (cache, clock) = cache_with_clock();
        cache.set("k", json!("old"), Some(Duration::from_millis(10)));
        clock.advance(Duration::from_millis(8));
        cache.set("k", json!("new"), Some(Duration::from_millis(10)));
        clock.advance(Duration::from_millis(8));

        assert_eq!(cache.get("k").as_deref(), Some(&json!("new")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_substring() {
        let (cache, _) = cache_with_clock();
        cache.set("/a/1", json!(1), None);
        cache.set("/a/2", json!(2), None);
        cache.set("/b/1", json!(3), None);

        assert_eq!(cache.invalidate(Some("/a")), 2);
        assert!(!cache.has("/a/1"));
        assert!(!cache.has("/a/2"));
        assert!(cache.has("/b/1"));
    }

    #[test]
    fn test_invalidate_matches_anywhere_in_key() {
        let (cache, _) = cache_with_clock();
        cache.set("/pharmacy/medicines", json!([]), None);
        cache.set("/pharmacy/bills", json!([]), None);
        cache.set("/patients:{\"ward\":\"pharmacy\"}", json!([]), None);
        cache.set("/staff", json!([]), None);

        assert_eq!(cache.invalidate(Some("/pharmacy")), 2);
        assert_eq!(cache.invalidate(Some("pharmacy")), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_all() {
        let (cache, _) = cache_with_clock();
        cache.set("/a/1", json!(1), None);
        cache.set("/z", json!(2), None);

        assert_eq!(cache.invalidate(None), 2);
        assert!(cache.is_empty());
        assert_eq!(cache.invalidate(None), 0, "no-op on empty cache");
    }

    #[test]
    fn test_unknown_key_is_miss() {
        let (cache, _) = cache_with_clock();
        assert!(cache.get("").is_none());
        assert!(!cache.has("/nope"));
    }

    #[test]
    fn test_disabled_cache_always_misses() {
        let cache = ApiCache::disabled();
        cache.set("k", json!(1), None);
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
        assert!(!cache.is_enabled());
    }

    #[test]
    fn test_from_config() {
        let config = CacheConfig {
            enabled: false,
            default_ttl: Duration::from_secs(5),
            ..CacheConfig::default()
        };
        let cache = ApiCache::from_config(&config);
        assert!(!cache.is_enabled());
        assert_eq!(cache.default_ttl(), Duration::from_secs(5));
    }

    #[test]
    fn test_purge_expired() {
        let (cache, clock) = cache_with_clock();
        cache.set("short", json!(1), Some(Duration::from_millis(5)));
        cache.set("long", json!(2), Some(Duration::from_secs(60)));

        clock.advance(Duration::from_millis(6));
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.has("long"));
    }

    #[test]
    fn test_stats() {
        let (cache, clock) = cache_with_clock();
        cache.set("a", json!(1), Some(Duration::from_millis(5)));
        cache.set("b", json!(2), None);

        assert!(cache.has("a"));
        assert!(!cache.has("missing"));
        clock.advance(Duration::from_millis(6));
        assert!(!cache.has("a"));
        cache.invalidate(Some("b"));

        let stats = cache.stats();
        assert_eq!(stats.size, 0);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.invalidations, 1);
        assert!((stats.hit_rate() - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_hit_rate_without_traffic() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[tokio::test]
    async fn test_fetched_value_uses_default_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache = ApiCache::new(Duration::from_millis(50)).with_clock(clock.clone());

        let fetched = cache
            .get_or_fetch("/staff", None, || async { Ok::<_, ()>(json!(["a"])) })
            .await
            .unwrap();
        assert_eq!(*fetched, json!(["a"]));

        clock.advance(Duration::from_millis(50));
        assert!(cache.has("/staff"));
        clock.advance(Duration::from_millis(1));
        assert!(!cache.has("/staff"));
    }

    #[tokio::test]
    async fn test_fetch_on_disabled_cache_is_not_stored() {
        let cache = ApiCache::disabled();
        let fetched = cache
            .get_or_fetch("/staff", None, || async { Ok::<_, ()>(json!(1)) })
            .await
            .unwrap();
        assert_eq!(*fetched, json!(1));
        assert!(cache.is_empty());
    }
}

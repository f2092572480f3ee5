//! In-process tier holding native values.

use dashmap::DashMap;
use std::time::Instant;

use super::entry::{CacheEntry, EntryOptions};
use super::stats::{CacheStats, Counters};
use crate::metrics;

const TIER: &str = "local";

/// Keyed in-process cache with absolute and sliding expiration.
///
/// Values are cloned out on read; nothing crosses a serialization boundary.
/// Expired entries are dropped lazily when they are next looked up.
#[derive(Debug)]
pub struct LocalCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    counters: Counters,
}

impl<V> Default for LocalCache<V> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
            counters: Counters::default(),
        }
    }
}

impl<V: Clone> LocalCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        if let Some(mut entry) = self.entries.get_mut(key) {
            if !entry.is_expired(now) {
                entry.touch(now);
                self.counters.hit();
                metrics::record_cache_hit(TIER);
                tracing::debug!(key = %key, "cache hit (local)");
                return Some(entry.data.clone());
            }
            drop(entry);
            self.entries.remove_if(key, |_, e| e.is_expired(now));
        }

        self.counters.miss();
        metrics::record_cache_miss(TIER);
        tracing::debug!(key = %key, "cache miss (local)");
        None
    }

    pub fn set(&self, key: &str, value: V, options: &EntryOptions) {
        self.entries
            .insert(key.to_string(), CacheEntry::new(value, options, Instant::now()));
        self.counters.set();
    }

    /// Removes `key`. Returns whether an entry was present.
    pub fn remove(&self, key: &str) -> bool {
        self.counters.removal();
        self.entries.remove(key).is_some()
    }

    /// Whether a live entry exists, without counting a hit or extending it.
    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries.get(key).is_some_and(|e| !e.is_expired(now))
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn options(absolute_ms: u64, sliding_ms: u64) -> EntryOptions {
        EntryOptions::new(
            Duration::from_millis(absolute_ms),
            Duration::from_millis(sliding_ms),
        )
    }

    #[test]
    fn get_after_set_is_a_hit() {
        let cache = LocalCache::new();
        cache.set("k", 7u32, &options(60_000, 60_000));

        assert_eq!(cache.get("k"), Some(7));
        assert_eq!(cache.get("other"), None);

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.sets), (1, 1, 1));
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn remove_counts_every_call() {
        let cache: LocalCache<u32> = LocalCache::new();
        cache.set("k", 1, &options(60_000, 60_000));

        assert!(cache.remove("k"));
        assert!(!cache.remove("k"));
        assert_eq!(cache.stats().removals, 2);
        assert!(!cache.contains("k"));
    }

    #[test]
    fn contains_does_not_touch_counters() {
        let cache = LocalCache::new();
        cache.set("k", "v".to_string(), &options(60_000, 60_000));
        assert!(cache.contains("k"));
        assert_eq!(cache.stats().hits, 0);
    }

    #[tokio::test]
    async fn sliding_expiry_evicts_idle_entries() {
        let cache = LocalCache::new();
        cache.set("idle", 1u8, &options(10_000, 100));

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(cache.get("idle"), None);
        assert_eq!(cache.stats().entries, 0);
    }
}

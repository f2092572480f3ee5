//! Shared-tier stand-in kept in process memory.
//!
//! Used when Redis is disabled or unreachable, and in tests. Entries are only
//! visible to this process, so multiple instances will not see each other's
//! fills.

use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use super::entry::{CacheEntry, EntryOptions};
use super::shared::{CacheError, SharedCache};
use super::stats::{CacheStats, Counters};

#[derive(Debug, Default)]
pub struct InMemorySharedCache {
    entries: DashMap<String, CacheEntry<Vec<u8>>>,
    counters: Counters,
}

impl InMemorySharedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a live entry exists, without extending it.
    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries.get(key).is_some_and(|e| !e.is_expired(now))
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.entries.len())
    }
}

fn ensure_live(cancel: &CancellationToken) -> Result<(), CacheError> {
    if cancel.is_cancelled() {
        Err(CacheError::Cancelled)
    } else {
        Ok(())
    }
}

#[async_trait]
impl SharedCache for InMemorySharedCache {
    async fn get(
        &self,
        key: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Vec<u8>>, CacheError> {
        ensure_live(cancel)?;
        let now = Instant::now();
        if let Some(mut entry) = self.entries.get_mut(key) {
            if !entry.is_expired(now) {
                entry.touch(now);
                self.counters.hit();
                return Ok(Some(entry.data.clone()));
            }
            drop(entry);
            self.entries.remove_if(key, |_, e| e.is_expired(now));
        }
        self.counters.miss();
        Ok(None)
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        options: &EntryOptions,
        cancel: &CancellationToken,
    ) -> Result<(), CacheError> {
        ensure_live(cancel)?;
        self.entries
            .insert(key.to_string(), CacheEntry::new(value, options, Instant::now()));
        self.counters.set();
        Ok(())
    }

    async fn remove(&self, key: &str, cancel: &CancellationToken) -> Result<(), CacheError> {
        ensure_live(cancel)?;
        self.counters.removal();
        self.entries.remove(key);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

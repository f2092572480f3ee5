//! Expiration bookkeeping shared by the in-process tiers.

use std::time::{Duration, Instant};

/// Per-entry expiration policy.
///
/// `absolute` bounds the lifetime from creation. `sliding` evicts an entry
/// that has not been read for that long; each read restarts the window, but
/// never past the absolute deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryOptions {
    pub absolute: Option<Duration>,
    pub sliding: Option<Duration>,
}

impl EntryOptions {
    pub const fn new(absolute: Duration, sliding: Duration) -> Self {
        Self {
            absolute: Some(absolute),
            sliding: Some(sliding),
        }
    }

    /// The shorter of the two windows as seen right after a write or a read.
    ///
    /// `None` when neither bound is set.
    pub fn initial_ttl(&self) -> Option<Duration> {
        match (self.absolute, self.sliding) {
            (Some(a), Some(s)) => Some(a.min(s)),
            (a, s) => a.or(s),
        }
    }
}

/// A cached value with its expiration state.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub data: V,
    created_at: Instant,
    last_access: Instant,
    absolute: Option<Duration>,
    sliding: Option<Duration>,
}

impl<V> CacheEntry<V> {
    pub fn new(data: V, options: &EntryOptions, now: Instant) -> Self {
        Self {
            data,
            created_at: now,
            last_access: now,
            absolute: options.absolute,
            sliding: options.sliding,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        let past_absolute = self
            .absolute
            .is_some_and(|abs| now.saturating_duration_since(self.created_at) >= abs);
        let past_sliding = self
            .sliding
            .is_some_and(|win| now.saturating_duration_since(self.last_access) >= win);
        past_absolute || past_sliding
    }

    /// Records a read, restarting the sliding window.
    pub fn touch(&mut self, now: Instant) {
        self.last_access = now;
    }
}

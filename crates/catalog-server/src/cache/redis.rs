//! Redis-backed shared tier.
//!
//! Each entry is a hash so the expiration policy travels with the payload:
//!
//! | field    | value                                           |
//! |----------|-------------------------------------------------|
//! | `data`   | serialized payload                              |
//! | `absexp` | absolute deadline, unix milliseconds, `-1` none |
//! | `sldexp` | sliding window in milliseconds, `-1` none       |
//!
//! The key TTL is kept at `min(sliding, time left until absexp)` and re-armed
//! on every hit, so Redis itself evicts idle or overdue entries.
//!
//! The field names follow the usual distributed-cache hash layout, but the
//! values do not match the .NET `IDistributedCache` encoding: deadlines here
//! are unix milliseconds rather than ticks, and payloads are camelCase JSON.
//! A .NET service pointed at the same keys cannot read these entries, and its
//! entries fail to decode here and are treated as misses.

use ::redis::AsyncCommands;
use async_trait::async_trait;
use deadpool_redis::{Connection, Pool};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio_util::sync::CancellationToken;

use super::entry::EntryOptions;
use super::shared::{CacheError, SharedCache};

const DATA_FIELD: &str = "data";
const ABSOLUTE_FIELD: &str = "absexp";
const SLIDING_FIELD: &str = "sldexp";
const NOT_PRESENT: i64 = -1;

#[derive(Clone)]
pub struct RedisSharedCache {
    pool: Pool,
    instance_name: String,
}

impl RedisSharedCache {
    /// `instance_name` is prepended to every key, e.g. `"CacheDemo_"`.
    pub fn new(pool: Pool, instance_name: impl Into<String>) -> Self {
        Self {
            pool,
            instance_name: instance_name.into(),
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{key}", self.instance_name)
    }

    async fn connection(&self) -> Result<Connection, CacheError> {
        Ok(self.pool.get().await?)
    }

    async fn get_inner(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.connection().await?;
        let (data, absexp, sldexp): (Option<Vec<u8>>, Option<i64>, Option<i64>) =
            ::redis::cmd("HMGET")
                .arg(key)
                .arg(DATA_FIELD)
                .arg(ABSOLUTE_FIELD)
                .arg(SLIDING_FIELD)
                .query_async(&mut conn)
                .await?;

        let Some(data) = data else {
            return Ok(None);
        };

        let now = unix_millis();
        let absexp = absexp.unwrap_or(NOT_PRESENT);
        if absexp != NOT_PRESENT && absexp <= now {
            return Ok(None);
        }

        if let Some(ttl) = refreshed_ttl(now, absexp, sldexp.unwrap_or(NOT_PRESENT)) {
            let refreshed: Result<(), _> = conn.pexpire(key, ttl).await;
            if let Err(e) = refreshed {
                tracing::warn!(key = %key, error = %e, "Redis PEXPIRE error");
            }
        }

        Ok(Some(data))
    }

    async fn set_inner(
        &self,
        key: &str,
        value: Vec<u8>,
        options: &EntryOptions,
    ) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let now = unix_millis();
        let absexp = options
            .absolute
            .map_or(NOT_PRESENT, |d| now + duration_millis(d));
        let sldexp = options.sliding.map_or(NOT_PRESENT, duration_millis);

        let mut pipe = ::redis::pipe();
        pipe.atomic()
            .cmd("HSET")
            .arg(key)
            .arg(DATA_FIELD)
            .arg(value)
            .arg(ABSOLUTE_FIELD)
            .arg(absexp)
            .arg(SLIDING_FIELD)
            .arg(sldexp)
            .ignore();
        match options.initial_ttl() {
            Some(ttl) => pipe.cmd("PEXPIRE").arg(key).arg(duration_millis(ttl)).ignore(),
            None => pipe.cmd("PERSIST").arg(key).ignore(),
        };

        let _: () = pipe.query_async(&mut conn).await?;
        tracing::debug!(key = %key, absexp, sldexp, "cache set (redis)");
        Ok(())
    }

    async fn remove_inner(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: () = conn.del(key).await?;
        Ok(())
    }
}

#[async_trait]
impl SharedCache for RedisSharedCache {
    async fn get(
        &self,
        key: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Vec<u8>>, CacheError> {
        let key = self.full_key(key);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CacheError::Cancelled),
            res = self.get_inner(&key) => res,
        }
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        options: &EntryOptions,
        cancel: &CancellationToken,
    ) -> Result<(), CacheError> {
        let key = self.full_key(key);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CacheError::Cancelled),
            res = self.set_inner(&key, value, options) => res,
        }
    }

    async fn remove(&self, key: &str, cancel: &CancellationToken) -> Result<(), CacheError> {
        let key = self.full_key(key);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CacheError::Cancelled),
            res = self.remove_inner(&key) => res,
        }
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, duration_millis)
}

fn duration_millis(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

/// TTL to re-arm after a hit: the sliding window, clipped to the absolute
/// deadline. `None` when the entry has no sliding window.
fn refreshed_ttl(now: i64, absexp: i64, sldexp: i64) -> Option<i64> {
    if sldexp == NOT_PRESENT {
        return None;
    }
    let ttl = if absexp == NOT_PRESENT {
        sldexp
    } else {
        sldexp.min(absexp - now)
    };
    (ttl > 0).then_some(ttl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_uses_sliding_window() {
        assert_eq!(refreshed_ttl(1_000, NOT_PRESENT, 500), Some(500));
    }

    #[test]
    fn refresh_is_clipped_by_absolute_deadline() {
        assert_eq!(refreshed_ttl(1_000, 1_200, 500), Some(200));
    }

    #[test]
    fn no_refresh_without_sliding_window() {
        assert_eq!(refreshed_ttl(1_000, 5_000, NOT_PRESENT), None);
        assert_eq!(refreshed_ttl(1_000, 1_000, 500), None);
    }
}

//! Contract of the shared, out-of-process tier.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::entry::EntryOptions;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    #[error("cache payload error: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("cache unavailable: {0}")]
    Unavailable(String),

    #[error("cache call cancelled")]
    Cancelled,
}

/// Keyed byte store with per-entry absolute and sliding expiration.
///
/// Calls may cross the network. Each one races the cancellation token and
/// returns [`CacheError::Cancelled`] if the token wins.
#[async_trait]
pub trait SharedCache: Send + Sync {
    /// Returns the payload and restarts its sliding window, or `None` on miss.
    async fn get(&self, key: &str, cancel: &CancellationToken)
    -> Result<Option<Vec<u8>>, CacheError>;

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        options: &EntryOptions,
        cancel: &CancellationToken,
    ) -> Result<(), CacheError>;

    /// Removing an absent key succeeds.
    async fn remove(&self, key: &str, cancel: &CancellationToken) -> Result<(), CacheError>;

    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}

pub type DynSharedCache = Arc<dyn SharedCache>;

//! The pair of tiers handed to every handler, with the degrade-on-error rules.

use catalog_core::ProductDto;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::entry::EntryOptions;
use super::local::LocalCache;
use super::shared::{CacheError, DynSharedCache};
use crate::metrics;

const SHARED_TIER: &str = "shared";

/// Local and shared tiers as seen by the operation handlers.
///
/// Shared-tier failures are logged and swallowed here so handlers only ever
/// see a hit, a miss, or a completed write.
#[derive(Clone)]
pub struct CacheTiers {
    local: Arc<LocalCache<ProductDto>>,
    shared: DynSharedCache,
}

impl CacheTiers {
    pub fn new(local: Arc<LocalCache<ProductDto>>, shared: DynSharedCache) -> Self {
        Self { local, shared }
    }

    pub fn local(&self) -> &LocalCache<ProductDto> {
        &self.local
    }

    pub fn shared(&self) -> &DynSharedCache {
        &self.shared
    }

    /// Reads and decodes a JSON payload from the shared tier.
    ///
    /// Errors become a miss. An undecodable payload is also evicted so the
    /// next fill replaces it.
    pub async fn shared_get_json<T: DeserializeOwned>(
        &self,
        key: &str,
        cancel: &CancellationToken,
    ) -> Option<T> {
        let bytes = match self.shared.get(key, cancel).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::debug!(key = %key, "cache miss (shared)");
                metrics::record_cache_miss(SHARED_TIER);
                return None;
            }
            Err(e) => {
                log_failure(key, "get", &e);
                metrics::record_cache_miss(SHARED_TIER);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                tracing::debug!(key = %key, "cache hit (shared)");
                metrics::record_cache_hit(SHARED_TIER);
                Some(value)
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "undecodable shared cache entry, evicting");
                metrics::record_cache_miss(SHARED_TIER);
                if let Err(e) = self.shared.remove(key, &CancellationToken::new()).await {
                    log_failure(key, "remove", &e);
                }
                None
            }
        }
    }

    /// Encodes `value` as JSON and stores it in the shared tier. Never fails.
    pub async fn shared_set_json<T: Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
        options: &EntryOptions,
        cancel: &CancellationToken,
    ) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                log_failure(key, "encode", &CacheError::from(e));
                return;
            }
        };
        if let Err(e) = self.shared.set(key, bytes, options, cancel).await {
            log_failure(key, "set", &e);
        }
    }

    /// Removes every key from both tiers.
    ///
    /// Runs after a store write has already been applied, so the shared
    /// removals use a fresh token: a cancelled caller cannot leave a stale
    /// entry behind.
    pub async fn invalidate(&self, keys: &[&str]) {
        let detached = CancellationToken::new();
        for key in keys {
            self.local.remove(key);
            if let Err(e) = self.shared.remove(key, &detached).await {
                log_failure(key, "remove", &e);
            }
            metrics::record_cache_invalidation();
            tracing::debug!(key = %key, "cache invalidated (local+shared)");
        }
    }
}

fn log_failure(key: &str, op: &'static str, error: &CacheError) {
    metrics::record_cache_error(SHARED_TIER, op);
    tracing::warn!(key = %key, op, error = %error, "shared cache call failed, continuing without it");
}

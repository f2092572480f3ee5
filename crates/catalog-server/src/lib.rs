pub mod cache;
pub mod config;
pub mod metrics;
pub mod middleware;
pub mod observability;
pub mod operations;
pub mod routes;
pub mod server;

pub use cache::{CacheTiers, DynSharedCache, InMemorySharedCache, LocalCache, RedisSharedCache};
pub use config::{AppConfig, CacheConfig, RedisConfig, StorageBackend, StorageConfig};
pub use observability::{apply_logging_level, init_tracing, shutdown_tracing};
pub use operations::{DispatchError, OperationError, OperationRegistry, registry_from_parts};
pub use server::{AppState, CatalogServer, ServerBuilder, build_app};

use std::sync::Arc;

use catalog_storage::{DynProductStore, StorageError};

/// Create the shared cache tier from configuration.
///
/// Falls back to the in-process stand-in when Redis is disabled or cannot be
/// reached, so the service still starts without it.
pub async fn create_shared_cache(config: &RedisConfig) -> DynSharedCache {
    use std::time::Duration;

    if !config.enabled {
        tracing::info!("Redis disabled, using in-process shared cache");
        return Arc::new(InMemorySharedCache::new());
    }

    tracing::info!(url = %config.url, instance_name = %config.instance_name, "Connecting to Redis");

    let mut redis_config = deadpool_redis::Config::from_url(&config.url);
    let mut pool_config = deadpool_redis::PoolConfig::new(config.pool_size);
    pool_config.timeouts.wait = Some(Duration::from_millis(config.timeout_ms));
    pool_config.timeouts.create = Some(Duration::from_millis(config.timeout_ms));
    pool_config.timeouts.recycle = Some(Duration::from_millis(config.timeout_ms));
    redis_config.pool = Some(pool_config);

    let pool = match redis_config.create_pool(Some(deadpool_redis::Runtime::Tokio1)) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to create Redis pool. Falling back to in-process shared cache."
            );
            return Arc::new(InMemorySharedCache::new());
        }
    };

    match pool.get().await {
        Ok(_) => {
            tracing::info!("Connected to Redis");
            Arc::new(RedisSharedCache::new(pool, config.instance_name.clone()))
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to connect to Redis. Falling back to in-process shared cache."
            );
            Arc::new(InMemorySharedCache::new())
        }
    }
}

/// Create the backing store selected in configuration.
pub async fn create_product_store(config: &StorageConfig) -> Result<DynProductStore, StorageError> {
    match config.backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory product store");
            Ok(catalog_db_memory::create_product_store())
        }
        StorageBackend::Postgres => {
            let store =
                catalog_db_postgres::PostgresProductStore::new(config.postgres.clone()).await?;
            tracing::info!("Using PostgreSQL product store");
            Ok(Arc::new(store))
        }
    }
}

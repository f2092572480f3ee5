//! PostgreSQL implementation of [`ProductStore`].

use async_trait::async_trait;
use catalog_core::Product;
use catalog_storage::{ProductStore, StorageError};
use sqlx_postgres::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::config::PostgresConfig;
use crate::pool;
use crate::queries::{self, InsertOutcome};
use crate::schema::SchemaManager;

/// Product store persisting to a single `products` table.
///
/// The token is checked before each statement is sent. A statement already
/// in flight is left to finish so a write is never half-applied.
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: PgPool,
}

impl PostgresProductStore {
    /// Connects and, if configured, bootstraps the table.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created or the DDL fails.
    pub async fn new(config: PostgresConfig) -> Result<Self, StorageError> {
        let pool = pool::create_pool(&config).await?;

        if config.ensure_schema {
            SchemaManager::new(pool.clone()).ensure_table().await?;
        }

        Ok(Self { pool })
    }

    /// Wraps an existing pool. The table is assumed to exist.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn ensure_live(cancel: &CancellationToken) -> Result<(), StorageError> {
    if cancel.is_cancelled() {
        Err(StorageError::Cancelled)
    } else {
        Ok(())
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    async fn get(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Option<Product>, StorageError> {
        ensure_live(cancel)?;
        Ok(queries::select_one(&self.pool, id).await?)
    }

    async fn get_all(&self, cancel: &CancellationToken) -> Result<Vec<Product>, StorageError> {
        ensure_live(cancel)?;
        Ok(queries::select_all(&self.pool).await?)
    }

    async fn insert(
        &self,
        product: &Product,
        cancel: &CancellationToken,
    ) -> Result<Product, StorageError> {
        ensure_live(cancel)?;
        match queries::insert(&self.pool, product).await? {
            InsertOutcome::Inserted(stored) => {
                debug!(product_id = %stored.id, "product inserted");
                Ok(stored)
            }
            InsertOutcome::Duplicate => Err(StorageError::already_exists(product.id)),
        }
    }

    async fn update(
        &self,
        product: &Product,
        cancel: &CancellationToken,
    ) -> Result<Product, StorageError> {
        ensure_live(cancel)?;
        queries::update(&self.pool, product)
            .await?
            .ok_or_else(|| StorageError::not_found(product.id))
    }

    async fn delete(&self, id: Uuid, cancel: &CancellationToken) -> Result<(), StorageError> {
        ensure_live(cancel)?;
        let removed = queries::delete(&self.pool, id).await?;
        debug!(product_id = %id, removed, "product delete issued");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

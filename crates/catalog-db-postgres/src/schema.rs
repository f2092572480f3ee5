//! Table bootstrap for the PostgreSQL backing store.

use sqlx_postgres::PgPool;
use tracing::{debug, info, instrument};

use crate::error::{PostgresError, Result};

/// Name of the single table holding catalog records.
pub const PRODUCTS_TABLE: &str = "products";

/// Creates the `products` table when it does not exist yet.
///
/// There is no migration history; the DDL is idempotent and safe to run on
/// every startup.
#[derive(Debug, Clone)]
pub struct SchemaManager {
    pool: PgPool,
}

impl SchemaManager {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn ensure_table(&self) -> Result<()> {
        if self.table_exists().await? {
            debug!(table = PRODUCTS_TABLE, "table already present");
            return Ok(());
        }

        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS "{PRODUCTS_TABLE}" (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                price NUMERIC(18, 2) NOT NULL,
                stock INTEGER NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NULL
            )
            "#
        );

        sqlx_core::query::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| PostgresError::schema(format!("create {PRODUCTS_TABLE}: {e}")))?;

        info!(table = PRODUCTS_TABLE, "created table");
        Ok(())
    }

    async fn table_exists(&self) -> Result<bool> {
        let row: Option<(bool,)> = sqlx_core::query_as::query_as(
            "SELECT EXISTS (
                SELECT FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )",
        )
        .bind(PRODUCTS_TABLE)
        .fetch_optional(&self.pool)
        .await
        .map_err(PostgresError::from)?;

        Ok(row.map(|(exists,)| exists).unwrap_or(false))
    }
}

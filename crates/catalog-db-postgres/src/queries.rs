//! SQL for each store operation.

use bigdecimal::BigDecimal;
use catalog_core::Product;
use chrono::{DateTime, Utc};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use sqlx_postgres::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{PG_UNIQUE_VIOLATION, PostgresError, Result, has_pg_error_code};

type ProductRow = (
    Uuid,
    String,
    String,
    BigDecimal,
    i32,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
);

const COLUMNS: &str = "id, name, description, price, stock, created_at, updated_at";

/// Outcome of an insert that may collide with an existing identity.
pub enum InsertOutcome {
    /// The row as PostgreSQL stored it.
    Inserted(Product),
    Duplicate,
}

fn chrono_to_time(dt: DateTime<Utc>) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(dt.timestamp()).unwrap_or(OffsetDateTime::UNIX_EPOCH)
        + time::Duration::nanoseconds(i64::from(dt.timestamp_subsec_nanos()))
}

fn time_to_chrono(dt: OffsetDateTime) -> DateTime<Utc> {
    DateTime::from_timestamp(dt.unix_timestamp(), dt.nanosecond()).unwrap_or_default()
}

fn row_to_product(row: ProductRow) -> Product {
    let (id, name, description, price, stock, created_at, updated_at) = row;
    Product {
        id,
        name,
        description,
        price,
        stock,
        created_at: chrono_to_time(created_at),
        updated_at: updated_at.map(chrono_to_time),
    }
}

pub async fn select_one(pool: &PgPool, id: Uuid) -> Result<Option<Product>> {
    let sql = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
    let row: Option<ProductRow> = query_as(&sql).bind(id).fetch_optional(pool).await?;
    Ok(row.map(row_to_product))
}

pub async fn select_all(pool: &PgPool) -> Result<Vec<Product>> {
    let sql = format!("SELECT {COLUMNS} FROM products ORDER BY created_at, id");
    let rows: Vec<ProductRow> = query_as(&sql).fetch_all(pool).await?;
    Ok(rows.into_iter().map(row_to_product).collect())
}

pub async fn insert(pool: &PgPool, product: &Product) -> Result<InsertOutcome> {
    let sql = format!(
        "INSERT INTO products (id, name, description, price, stock, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {COLUMNS}"
    );
    let result: std::result::Result<ProductRow, _> = query_as(&sql)
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.price)
        .bind(product.stock)
        .bind(time_to_chrono(product.created_at))
        .bind(product.updated_at.map(time_to_chrono))
        .fetch_one(pool)
        .await;

    match result {
        Ok(row) => Ok(InsertOutcome::Inserted(row_to_product(row))),
        Err(e) if has_pg_error_code(&e, PG_UNIQUE_VIOLATION) => Ok(InsertOutcome::Duplicate),
        Err(e) => Err(PostgresError::from(e)),
    }
}

/// Overwrites the mutable columns and stamps `updated_at = NOW()`.
///
/// Returns `None` when no row matched.
pub async fn update(pool: &PgPool, product: &Product) -> Result<Option<Product>> {
    let sql = format!(
        "UPDATE products
         SET name = $2, description = $3, price = $4, stock = $5, updated_at = NOW()
         WHERE id = $1
         RETURNING {COLUMNS}"
    );
    let row: Option<ProductRow> = query_as(&sql)
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.price)
        .bind(product.stock)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(row_to_product))
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64> {
    let done = query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(done.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_conversion_keeps_subsecond_precision() {
        let now = OffsetDateTime::now_utc();
        let micros = now.replace_nanosecond(now.nanosecond() / 1000 * 1000).unwrap();
        assert_eq!(chrono_to_time(time_to_chrono(micros)), micros);
    }
}

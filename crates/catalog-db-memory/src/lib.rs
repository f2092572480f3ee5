//! In-memory backing store for the catalog service.
//!
//! Records live in a `DashMap` keyed by identity and vanish with the process.
//! Used for local development and every test that does not need PostgreSQL.
//!
//! ```ignore
//! use catalog_db_memory::create_product_store;
//!
//! let store = create_product_store();
//! store.insert(&product, &CancellationToken::new()).await?;
//! ```

mod storage;

pub use storage::InMemoryProductStore;

/// Creates a new shareable in-memory store.
pub fn create_product_store() -> catalog_storage::DynProductStore {
    std::sync::Arc::new(InMemoryProductStore::new())
}

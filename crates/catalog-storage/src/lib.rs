//! # catalog-storage
//!
//! Backing store abstraction for the catalog service.
//!
//! This crate only defines the contract. Implementations live in
//! `catalog-db-memory` and `catalog-db-postgres`.
//!
//! ```ignore
//! use catalog_storage::{ProductStore, StorageError};
//!
//! async fn stock_of(store: &dyn ProductStore, id: Uuid) -> Result<Option<i32>, StorageError> {
//!     let cancel = CancellationToken::new();
//!     Ok(store.get(id, &cancel).await?.map(|p| p.stock))
//! }
//! ```

mod error;
mod traits;

pub use error::StorageError;
pub use traits::ProductStore;

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for a shared store trait object.
pub type DynProductStore = std::sync::Arc<dyn ProductStore>;

pub mod prelude {
    pub use crate::{DynProductStore, ProductStore, StorageError, StorageResult};
}

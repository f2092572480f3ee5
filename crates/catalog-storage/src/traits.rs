//! The backing store contract.

use async_trait::async_trait;
use catalog_core::Product;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::StorageError;

/// Durable product storage.
///
/// Every method takes a cancellation token. Implementations check it before
/// touching the backend and return [`StorageError::Cancelled`] if it already
/// fired; once a write has been issued it runs to completion.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Fetches a single product by identity.
    ///
    /// Returns `Ok(None)` when no record exists.
    async fn get(&self, id: Uuid, cancel: &CancellationToken)
    -> Result<Option<Product>, StorageError>;

    /// Fetches every stored product, oldest first.
    async fn get_all(&self, cancel: &CancellationToken) -> Result<Vec<Product>, StorageError>;

    /// Persists a new product. Returns the record as stored, which may differ
    /// from the input where the backend rounds values.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if the identity is taken.
    async fn insert(&self, product: &Product, cancel: &CancellationToken)
    -> Result<Product, StorageError>;

    /// Overwrites the mutable fields of an existing product and stamps its
    /// update time. Returns the record as stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the record vanished concurrently.
    async fn update(
        &self,
        product: &Product,
        cancel: &CancellationToken,
    ) -> Result<Product, StorageError>;

    /// Removes a product. Deleting an absent identity is a no-op.
    async fn delete(&self, id: Uuid, cancel: &CancellationToken) -> Result<(), StorageError>;

    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}

//! Request and handler traits, plus the errors an operation can raise.

use async_trait::async_trait;
use catalog_storage::StorageError;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::registry::{HandlerSlots, OperationRegistry};

/// The five catalog operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    GetProductById,
    GetAllProducts,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
}

impl OperationKind {
    pub const ALL: [OperationKind; 5] = [
        OperationKind::GetProductById,
        OperationKind::GetAllProducts,
        OperationKind::CreateProduct,
        OperationKind::UpdateProduct,
        OperationKind::DeleteProduct,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            OperationKind::GetProductById => "get_product_by_id",
            OperationKind::GetAllProducts => "get_all_products",
            OperationKind::CreateProduct => "create_product",
            OperationKind::UpdateProduct => "update_product",
            OperationKind::DeleteProduct => "delete_product",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures that abort an operation.
///
/// A missing product is not one of them; handlers report it as a failed
/// `CommandResult`.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("store error: {0}")]
    Storage(StorageError),

    #[error("operation cancelled")]
    Cancelled,
}

impl From<StorageError> for OperationError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Cancelled => OperationError::Cancelled,
            other => OperationError::Storage(other),
        }
    }
}

impl From<OperationError> for catalog_api::ApiError {
    fn from(err: OperationError) -> Self {
        match err {
            OperationError::Storage(StorageError::AlreadyExists { id }) => {
                catalog_api::ApiError::conflict(format!("Product {id} already exists"))
            }
            OperationError::Storage(e) => catalog_api::ApiError::internal(e.to_string()),
            OperationError::Cancelled => {
                catalog_api::ApiError::service_unavailable("Request was cancelled")
            }
        }
    }
}

/// An operation value with a statically known handler slot.
///
/// Implemented once per operation type. The slot accessors tie the type to a
/// field of the registry, so routing needs no runtime type inspection.
pub trait Request: Send + Sized + 'static {
    type Response: Send + 'static;

    const KIND: OperationKind;

    #[doc(hidden)]
    fn slot(slots: &mut HandlerSlots) -> &mut Option<DynRequestHandler<Self>>;

    #[doc(hidden)]
    fn handler(registry: &OperationRegistry) -> &DynRequestHandler<Self>;
}

/// Executes one kind of [`Request`].
#[async_trait]
pub trait RequestHandler<R: Request>: Send + Sync {
    async fn handle(
        &self,
        request: R,
        cancel: &CancellationToken,
    ) -> Result<R::Response, OperationError>;
}

pub type DynRequestHandler<R> = Arc<dyn RequestHandler<R>>;

/// Returns `Cancelled` if the caller has gone away.
///
/// Called before the first store call and before each store write. Never
/// called between a write and its cache invalidation.
pub(crate) fn ensure_live(cancel: &CancellationToken) -> Result<(), OperationError> {
    if cancel.is_cancelled() {
        Err(OperationError::Cancelled)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_api::ApiError;
    use uuid::Uuid;

    #[test]
    fn cancelled_store_error_becomes_cancelled() {
        let err = OperationError::from(StorageError::Cancelled);
        assert!(matches!(err, OperationError::Cancelled));
    }

    #[test]
    fn api_mapping() {
        let conflict: ApiError = OperationError::from(StorageError::already_exists(Uuid::nil())).into();
        assert!(matches!(conflict, ApiError::Conflict(_)));

        let internal: ApiError = OperationError::from(StorageError::internal("boom")).into();
        assert!(matches!(internal, ApiError::Internal(_)));

        let cancelled: ApiError = OperationError::Cancelled.into();
        assert!(matches!(cancelled, ApiError::ServiceUnavailable(_)));
    }

    #[test]
    fn kinds_have_distinct_names() {
        let mut names: Vec<_> = OperationKind::ALL.iter().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), OperationKind::ALL.len());
    }
}

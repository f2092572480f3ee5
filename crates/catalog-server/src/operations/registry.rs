//! Typed dispatcher from operation values to their single handler.
//!
//! Every operation type owns one slot. The builder rejects a second handler
//! for a slot and refuses to build while any slot is empty, so a wiring
//! mistake stops the process at startup instead of failing a request.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::create_product::CreateProduct;
use super::delete_product::DeleteProduct;
use super::get_all_products::GetAllProducts;
use super::get_product::GetProductById;
use super::handler::{DynRequestHandler, OperationError, OperationKind, Request, RequestHandler};
use super::update_product::UpdateProduct;
use crate::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("a handler for {0} is already registered")]
    DuplicateHandler(OperationKind),

    #[error("no handler registered for {0}")]
    MissingHandler(OperationKind),
}

/// Handler slots filled while building.
#[derive(Default)]
pub struct HandlerSlots {
    pub(crate) get_product: Option<DynRequestHandler<GetProductById>>,
    pub(crate) get_all_products: Option<DynRequestHandler<GetAllProducts>>,
    pub(crate) create_product: Option<DynRequestHandler<CreateProduct>>,
    pub(crate) update_product: Option<DynRequestHandler<UpdateProduct>>,
    pub(crate) delete_product: Option<DynRequestHandler<DeleteProduct>>,
}

/// Fully wired dispatcher. Cheap to clone.
#[derive(Clone)]
pub struct OperationRegistry {
    pub(crate) get_product: DynRequestHandler<GetProductById>,
    pub(crate) get_all_products: DynRequestHandler<GetAllProducts>,
    pub(crate) create_product: DynRequestHandler<CreateProduct>,
    pub(crate) update_product: DynRequestHandler<UpdateProduct>,
    pub(crate) delete_product: DynRequestHandler<DeleteProduct>,
}

#[derive(Default)]
pub struct OperationRegistryBuilder {
    slots: HandlerSlots,
}

impl OperationRegistryBuilder {
    /// Registers the handler for `R`.
    ///
    /// # Errors
    ///
    /// `DuplicateHandler` if `R` already has one.
    pub fn register<R: Request>(
        self,
        handler: impl RequestHandler<R> + 'static,
    ) -> Result<Self, DispatchError> {
        self.register_shared::<R>(Arc::new(handler))
    }

    /// Same as [`register`](Self::register) for an already shared handler.
    pub fn register_shared<R: Request>(
        mut self,
        handler: DynRequestHandler<R>,
    ) -> Result<Self, DispatchError> {
        let slot = R::slot(&mut self.slots);
        if slot.is_some() {
            return Err(DispatchError::DuplicateHandler(R::KIND));
        }
        *slot = Some(handler);
        tracing::debug!(operation = %R::KIND, "handler registered");
        Ok(self)
    }

    /// # Errors
    ///
    /// `MissingHandler` naming the first operation without a handler.
    pub fn build(self) -> Result<OperationRegistry, DispatchError> {
        let HandlerSlots {
            get_product,
            get_all_products,
            create_product,
            update_product,
            delete_product,
        } = self.slots;

        Ok(OperationRegistry {
            get_product: get_product
                .ok_or(DispatchError::MissingHandler(OperationKind::GetProductById))?,
            get_all_products: get_all_products
                .ok_or(DispatchError::MissingHandler(OperationKind::GetAllProducts))?,
            create_product: create_product
                .ok_or(DispatchError::MissingHandler(OperationKind::CreateProduct))?,
            update_product: update_product
                .ok_or(DispatchError::MissingHandler(OperationKind::UpdateProduct))?,
            delete_product: delete_product
                .ok_or(DispatchError::MissingHandler(OperationKind::DeleteProduct))?,
        })
    }
}

impl OperationRegistry {
    pub fn builder() -> OperationRegistryBuilder {
        OperationRegistryBuilder::default()
    }

    /// Routes `request` to its handler and returns the handler's result as is.
    pub async fn send<R: Request>(
        &self,
        request: R,
        cancel: &CancellationToken,
    ) -> Result<R::Response, OperationError> {
        tracing::debug!(operation = %R::KIND, "dispatching");
        let result = R::handler(self).handle(request, cancel).await;

        let outcome = match &result {
            Ok(_) => "completed",
            Err(OperationError::Cancelled) => "cancelled",
            Err(OperationError::Storage(_)) => "error",
        };
        metrics::record_operation(R::KIND.as_str(), outcome);
        result
    }
}

//! Remove a product, then drop its cached item and the collection.

use async_trait::async_trait;
use catalog_core::{CommandResult, PRODUCT_NOT_FOUND};
use catalog_storage::DynProductStore;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::handler::{
    DynRequestHandler, OperationError, OperationKind, Request, RequestHandler, ensure_live,
};
use super::registry::{HandlerSlots, OperationRegistry};
use crate::cache::{ALL_PRODUCTS, CacheTiers, product_key};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteProduct {
    pub id: Uuid,
}

impl Request for DeleteProduct {
    type Response = CommandResult<bool>;
    const KIND: OperationKind = OperationKind::DeleteProduct;

    fn slot(slots: &mut HandlerSlots) -> &mut Option<DynRequestHandler<Self>> {
        &mut slots.delete_product
    }

    fn handler(registry: &OperationRegistry) -> &DynRequestHandler<Self> {
        &registry.delete_product
    }
}

pub struct DeleteProductHandler {
    store: DynProductStore,
    tiers: CacheTiers,
}

impl DeleteProductHandler {
    pub fn new(store: DynProductStore, tiers: CacheTiers) -> Self {
        Self { store, tiers }
    }
}

#[async_trait]
impl RequestHandler<DeleteProduct> for DeleteProductHandler {
    async fn handle(
        &self,
        request: DeleteProduct,
        cancel: &CancellationToken,
    ) -> Result<CommandResult<bool>, OperationError> {
        ensure_live(cancel)?;
        if self.store.get(request.id, cancel).await?.is_none() {
            return Ok(CommandResult::failure(PRODUCT_NOT_FOUND));
        }

        ensure_live(cancel)?;
        self.store.delete(request.id, cancel).await?;

        let item_key = product_key(request.id);
        self.tiers.invalidate(&[item_key.as_str(), ALL_PRODUCTS]).await;

        tracing::info!(product_id = %request.id, "product deleted");
        Ok(CommandResult::success(true))
    }
}

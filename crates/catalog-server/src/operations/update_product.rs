//! Overwrite a product, then drop its cached item and the collection.

use async_trait::async_trait;
use catalog_core::{BigDecimal, CommandResult, PRODUCT_NOT_FOUND, ProductDto};
use catalog_storage::DynProductStore;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::handler::{
    DynRequestHandler, OperationError, OperationKind, Request, RequestHandler, ensure_live,
};
use super::registry::{HandlerSlots, OperationRegistry};
use crate::cache::{ALL_PRODUCTS, CacheTiers, product_key};

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateProduct {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub stock: i32,
}

impl Request for UpdateProduct {
    type Response = CommandResult<ProductDto>;
    const KIND: OperationKind = OperationKind::UpdateProduct;

    fn slot(slots: &mut HandlerSlots) -> &mut Option<DynRequestHandler<Self>> {
        &mut slots.update_product
    }

    fn handler(registry: &OperationRegistry) -> &DynRequestHandler<Self> {
        &registry.update_product
    }
}

pub struct UpdateProductHandler {
    store: DynProductStore,
    tiers: CacheTiers,
}

impl UpdateProductHandler {
    pub fn new(store: DynProductStore, tiers: CacheTiers) -> Self {
        Self { store, tiers }
    }
}

#[async_trait]
impl RequestHandler<UpdateProduct> for UpdateProductHandler {
    async fn handle(
        &self,
        request: UpdateProduct,
        cancel: &CancellationToken,
    ) -> Result<CommandResult<ProductDto>, OperationError> {
        ensure_live(cancel)?;
        let Some(mut product) = self.store.get(request.id, cancel).await? else {
            return Ok(CommandResult::failure(PRODUCT_NOT_FOUND));
        };

        product.apply_changes(request.name, request.description, request.price, request.stock);

        ensure_live(cancel)?;
        let stored = match self.store.update(&product, cancel).await {
            Ok(stored) => stored,
            // Deleted between the read and the write: nothing was written.
            Err(e) if e.is_not_found() => return Ok(CommandResult::failure(PRODUCT_NOT_FOUND)),
            Err(e) => return Err(e.into()),
        };

        // Persisted; from here on nothing may bail out before invalidation.
        let item_key = product_key(request.id);
        self.tiers.invalidate(&[item_key.as_str(), ALL_PRODUCTS]).await;

        tracing::info!(product_id = %request.id, "product updated");
        Ok(CommandResult::success(ProductDto::from(stored)))
    }
}

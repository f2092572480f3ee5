//! Read one product through the local tier.

use async_trait::async_trait;
use catalog_core::{CommandResult, PRODUCT_NOT_FOUND, ProductDto};
use catalog_storage::DynProductStore;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::handler::{
    DynRequestHandler, OperationError, OperationKind, Request, RequestHandler, ensure_live,
};
use super::registry::{HandlerSlots, OperationRegistry};
use crate::cache::{CacheTiers, EntryOptions, product_key};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetProductById {
    pub id: Uuid,
}

impl Request for GetProductById {
    type Response = CommandResult<ProductDto>;
    const KIND: OperationKind = OperationKind::GetProductById;

    fn slot(slots: &mut HandlerSlots) -> &mut Option<DynRequestHandler<Self>> {
        &mut slots.get_product
    }

    fn handler(registry: &OperationRegistry) -> &DynRequestHandler<Self> {
        &registry.get_product
    }
}

/// Checks the local tier, falls back to the store, and fills the local tier
/// on a found record. Misses for unknown ids are not cached.
pub struct GetProductByIdHandler {
    store: DynProductStore,
    tiers: CacheTiers,
    entry_options: EntryOptions,
}

impl GetProductByIdHandler {
    pub fn new(store: DynProductStore, tiers: CacheTiers, entry_options: EntryOptions) -> Self {
        Self {
            store,
            tiers,
            entry_options,
        }
    }
}

#[async_trait]
impl RequestHandler<GetProductById> for GetProductByIdHandler {
    async fn handle(
        &self,
        request: GetProductById,
        cancel: &CancellationToken,
    ) -> Result<CommandResult<ProductDto>, OperationError> {
        let key = product_key(request.id);

        if let Some(cached) = self.tiers.local().get(&key) {
            return Ok(CommandResult::success(cached));
        }

        ensure_live(cancel)?;
        let Some(product) = self.store.get(request.id, cancel).await? else {
            tracing::debug!(product_id = %request.id, "product not found");
            return Ok(CommandResult::failure(PRODUCT_NOT_FOUND));
        };

        let dto = ProductDto::from(product);
        self.tiers.local().set(&key, dto.clone(), &self.entry_options);
        Ok(CommandResult::success(dto))
    }
}

//! Read the whole catalog through the shared tier.

use async_trait::async_trait;
use catalog_core::{CommandResult, ProductDto};
use catalog_storage::DynProductStore;
use tokio_util::sync::CancellationToken;

use super::handler::{
    DynRequestHandler, OperationError, OperationKind, Request, RequestHandler, ensure_live,
};
use super::registry::{HandlerSlots, OperationRegistry};
use crate::cache::{ALL_PRODUCTS, CacheTiers, EntryOptions};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetAllProducts;

impl Request for GetAllProducts {
    type Response = CommandResult<Vec<ProductDto>>;
    const KIND: OperationKind = OperationKind::GetAllProducts;

    fn slot(slots: &mut HandlerSlots) -> &mut Option<DynRequestHandler<Self>> {
        &mut slots.get_all_products
    }

    fn handler(registry: &OperationRegistry) -> &DynRequestHandler<Self> {
        &registry.get_all_products
    }
}

/// Serves the collection from the shared tier, or loads the full set from
/// the store and stores it there as JSON.
pub struct GetAllProductsHandler {
    store: DynProductStore,
    tiers: CacheTiers,
    entry_options: EntryOptions,
}

impl GetAllProductsHandler {
    pub fn new(store: DynProductStore, tiers: CacheTiers, entry_options: EntryOptions) -> Self {
        Self {
            store,
            tiers,
            entry_options,
        }
    }
}

#[async_trait]
impl RequestHandler<GetAllProducts> for GetAllProductsHandler {
    async fn handle(
        &self,
        _request: GetAllProducts,
        cancel: &CancellationToken,
    ) -> Result<CommandResult<Vec<ProductDto>>, OperationError> {
        if let Some(cached) = self
            .tiers
            .shared_get_json::<Vec<ProductDto>>(ALL_PRODUCTS, cancel)
            .await
        {
            return Ok(CommandResult::success(cached));
        }

        ensure_live(cancel)?;
        let products = self.store.get_all(cancel).await?;
        let dtos: Vec<ProductDto> = products.into_iter().map(ProductDto::from).collect();

        self.tiers
            .shared_set_json(ALL_PRODUCTS, &dtos, &self.entry_options, cancel)
            .await;
        Ok(CommandResult::success(dtos))
    }
}

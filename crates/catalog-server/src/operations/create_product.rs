//! Insert a product and drop the cached collection.

use async_trait::async_trait;
use catalog_core::{BigDecimal, CommandResult, Product, ProductDto};
use catalog_storage::DynProductStore;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use super::handler::{
    DynRequestHandler, OperationError, OperationKind, Request, RequestHandler, ensure_live,
};
use super::registry::{HandlerSlots, OperationRegistry};
use crate::cache::{ALL_PRODUCTS, CacheTiers};

/// Body of `POST /api/products`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: BigDecimal,
    pub stock: i32,
}

impl Request for CreateProduct {
    type Response = CommandResult<ProductDto>;
    const KIND: OperationKind = OperationKind::CreateProduct;

    fn slot(slots: &mut HandlerSlots) -> &mut Option<DynRequestHandler<Self>> {
        &mut slots.create_product
    }

    fn handler(registry: &OperationRegistry) -> &DynRequestHandler<Self> {
        &registry.create_product
    }
}

pub struct CreateProductHandler {
    store: DynProductStore,
    tiers: CacheTiers,
}

impl CreateProductHandler {
    pub fn new(store: DynProductStore, tiers: CacheTiers) -> Self {
        Self { store, tiers }
    }
}

#[async_trait]
impl RequestHandler<CreateProduct> for CreateProductHandler {
    async fn handle(
        &self,
        request: CreateProduct,
        cancel: &CancellationToken,
    ) -> Result<CommandResult<ProductDto>, OperationError> {
        let product = Product::new(
            request.name,
            request.description,
            request.price,
            request.stock,
        );

        ensure_live(cancel)?;
        let stored = self.store.insert(&product, cancel).await?;

        // A fresh id cannot be in the item cache yet; only the collection changed.
        self.tiers.invalidate(&[ALL_PRODUCTS]).await;

        tracing::info!(product_id = %stored.id, "product created");
        Ok(CommandResult::success(ProductDto::from(stored)))
    }
}

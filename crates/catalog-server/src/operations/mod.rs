//! Catalog operations and the dispatcher that routes them.
//!
//! | Operation         | Tier read | Store call        | Keys invalidated            |
//! |-------------------|-----------|-------------------|-----------------------------|
//! | `GetProductById`  | local     | `get` on miss     | none                        |
//! | `GetAllProducts`  | shared    | `get_all` on miss | none                        |
//! | `CreateProduct`   | none      | `insert`          | `all-products`              |
//! | `UpdateProduct`   | none      | `get`, `update`   | `product-{id}`, `all-products` |
//! | `DeleteProduct`   | none      | `get`, `delete`   | `product-{id}`, `all-products` |
//!
//! Invalidation always clears both tiers and always follows the store write.

pub mod create_product;
pub mod delete_product;
pub mod get_all_products;
pub mod get_product;
pub mod handler;
pub mod registry;
pub mod update_product;

pub use create_product::{CreateProduct, CreateProductHandler};
pub use delete_product::{DeleteProduct, DeleteProductHandler};
pub use get_all_products::{GetAllProducts, GetAllProductsHandler};
pub use get_product::{GetProductById, GetProductByIdHandler};
pub use handler::{DynRequestHandler, OperationError, OperationKind, Request, RequestHandler};
pub use registry::{DispatchError, OperationRegistry, OperationRegistryBuilder};
pub use update_product::{UpdateProduct, UpdateProductHandler};

use catalog_storage::DynProductStore;

use crate::cache::CacheTiers;
use crate::config::CacheConfig;

/// Registers the standard handler for every operation.
pub fn registry_from_parts(
    store: DynProductStore,
    tiers: CacheTiers,
    cache: &CacheConfig,
) -> Result<OperationRegistry, DispatchError> {
    OperationRegistry::builder()
        .register::<GetProductById>(GetProductByIdHandler::new(
            store.clone(),
            tiers.clone(),
            cache.product_entry(),
        ))?
        .register::<GetAllProducts>(GetAllProductsHandler::new(
            store.clone(),
            tiers.clone(),
            cache.collection_entry(),
        ))?
        .register::<CreateProduct>(CreateProductHandler::new(store.clone(), tiers.clone()))?
        .register::<UpdateProduct>(UpdateProductHandler::new(store.clone(), tiers.clone()))?
        .register::<DeleteProduct>(DeleteProductHandler::new(store, tiers))?
        .build()
}

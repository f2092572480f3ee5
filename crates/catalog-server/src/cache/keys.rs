//! Cache key formats.
//!
//! These strings are read by other deployments sharing the same Redis, so
//! they must stay byte-for-byte stable.

use uuid::Uuid;

/// Key of the full product collection.
pub const ALL_PRODUCTS: &str = "all-products";

const PRODUCT_PREFIX: &str = "product-";

/// Key of a single product: `product-` followed by the lowercase hyphenated id.
#[inline]
pub fn product_key(id: Uuid) -> String {
    format!("{PRODUCT_PREFIX}{}", id.hyphenated())
}

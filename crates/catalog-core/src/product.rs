//! Product entity and its flattened transfer representation.

use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{generate_id, now_utc};

/// Failure message used whenever a product identity has no stored record.
pub const PRODUCT_NOT_FOUND: &str = "Product not found";

/// Decimal places kept for prices, matching the `NUMERIC(18, 2)` column.
const PRICE_SCALE: i64 = 2;

/// Rounds half away from zero to [`PRICE_SCALE`] places, as PostgreSQL does.
fn normalize_price(price: &BigDecimal) -> BigDecimal {
    price.with_scale_round(PRICE_SCALE, RoundingMode::HalfUp)
}

/// A stored catalog record.
///
/// `id` and `created_at` are fixed when the record is first built and never
/// change afterwards. `updated_at` stays `None` until the store applies the
/// first successful update.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
}

impl Product {
    /// Builds a brand new record with a fresh identity stamped now.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: BigDecimal,
        stock: i32,
    ) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            description: description.into(),
            price: normalize_price(&price),
            stock,
            created_at: now_utc(),
            updated_at: None,
        }
    }

    /// Overwrites every mutable field. Identity and timestamps are untouched.
    pub fn apply_changes(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        price: BigDecimal,
        stock: i32,
    ) {
        self.name = name.into();
        self.description = description.into();
        self.price = normalize_price(&price);
        self.stock = stock;
    }
}

/// Serializable projection of [`Product`] used for cache payloads and results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub stock: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl From<&Product> for ProductDto {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.clone(),
            stock: product.stock,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample() -> Product {
        Product::new("Widget", "A small widget", BigDecimal::from_str("9.99").unwrap(), 3)
    }

    #[test]
    fn new_product_has_no_update_stamp() {
        let product = sample();
        assert!(product.updated_at.is_none());
        assert_eq!(product.stock, 3);
    }

    #[test]
    fn apply_changes_keeps_identity_and_creation_time() {
        let mut product = sample();
        let (id, created) = (product.id, product.created_at);
        product.apply_changes("Gadget", "Bigger", BigDecimal::from(20), 7);
        assert_eq!(product.id, id);
        assert_eq!(product.created_at, created);
        assert_eq!(product.name, "Gadget");
        assert_eq!(product.price, BigDecimal::from(20));
    }

    #[test]
    fn prices_are_kept_to_two_places() {
        let product = Product::new("Bolt", "", BigDecimal::from_str("12.345").unwrap(), 1);
        assert_eq!(product.price.to_string(), "12.35");

        let mut product = sample();
        product.apply_changes("Nut", "", BigDecimal::from(4), 1);
        assert_eq!(product.price.to_string(), "4.00");
    }

    #[test]
    fn numeric_json_price_parses_exactly() {
        let json = r#"{
            "id": "6f9619ff-8b86-d011-b42d-00c04fc964ff",
            "name": "Cable",
            "description": "",
            "price": 19.99,
            "stock": 2,
            "createdAt": "2024-03-01T12:00:00Z"
        }"#;
        let dto: ProductDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.price, BigDecimal::from_str("19.99").unwrap());
        assert_eq!(dto.price.to_string(), "19.99");
        assert_eq!(serde_json::to_value(&dto).unwrap()["price"], "19.99");
    }

    #[test]
    fn dto_serializes_camel_case() {
        let dto = ProductDto::from(&sample());
        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").unwrap().is_null());
        assert_eq!(json["name"], "Widget");

        let back: ProductDto = serde_json::from_value(json).unwrap();
        assert_eq!(back, dto);
    }
}

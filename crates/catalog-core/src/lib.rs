pub mod id;
pub mod product;
pub mod result;
pub mod time;

pub use id::{generate_id, parse_id};
pub use product::{PRODUCT_NOT_FOUND, Product, ProductDto};
pub use result::CommandResult;
pub use time::now_utc;

/// Re-exported so downstream crates agree on a single decimal type.
pub use bigdecimal::BigDecimal;

//! Two cache tiers used by the operation handlers.
//!
//! - **Local tier** ([`LocalCache`]): in-process DashMap holding native
//!   values, per-process, lost on restart. Single-item reads use it.
//! - **Shared tier** ([`SharedCache`]): serialized bytes reachable by every
//!   instance. Redis when configured, otherwise an in-process stand-in.
//!   Collection reads use it.
//!
//! ```text
//! GET /api/products/{id} → local tier  → store
//! GET /api/products      → shared tier → store
//! writes                 → store → invalidate both tiers
//! ```
//!
//! Both tiers apply absolute and sliding expiration per entry. A failing
//! shared tier never fails an operation; [`CacheTiers`] degrades every error
//! to a miss or a no-op.

pub mod entry;
pub mod keys;
pub mod local;
pub mod memory;
pub mod redis;
pub mod shared;
pub mod stats;
pub mod tiers;

pub use entry::{CacheEntry, EntryOptions};
pub use keys::{ALL_PRODUCTS, product_key};
pub use local::LocalCache;
pub use memory::InMemorySharedCache;
pub use redis::RedisSharedCache;
pub use shared::{CacheError, DynSharedCache, SharedCache};
pub use stats::CacheStats;
pub use tiers::CacheTiers;

//! Cache layer
//!
//! Two independently-scoped caches shared across worker tasks:
//! - `price_cache` - read-through item-price cache (unbounded by default)
//! - `result_cache` - strict-LRU cache of per-order processing results
//! - `lru` - the underlying strict-LRU map

pub mod lru;
pub mod price_cache;
pub mod result_cache;

pub use lru::LruCache;
pub use price_cache::PriceCache;
pub use result_cache::{CacheStats, ResultCache};

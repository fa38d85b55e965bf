//! Read-through price cache
//!
//! Maps item ids to unit prices so repeated items across orders are priced
//! once. The calculator consults this cache before an item's own embedded
//! price; on a miss it stores the embedded price for later orders.
//!
//! # Thread Safety
//!
//! Backed by `DashMap` for fine-grained locking: workers pricing different
//! items never contend, and updates are atomic per key. Repeated inserts for
//! the same item converge on the same price, so insert ordering between
//! concurrent workers does not matter.

use crate::types::ItemId;
use dashmap::DashMap;
use rust_decimal::Decimal;

/// Shared item-price cache
///
/// Unbounded by default - item prices are low-cardinality relative to
/// orders. An optional entry bound can be configured; once the bound is
/// reached, prices for new items are simply not cached (orders still compute
/// from their embedded prices), keeping the bound a memory cap rather than
/// an eviction policy.
#[derive(Debug)]
pub struct PriceCache {
    prices: DashMap<ItemId, Decimal>,
    capacity: Option<usize>,
}

impl PriceCache {
    /// Create a cache with an optional entry bound
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            prices: DashMap::new(),
            capacity,
        }
    }

    /// Create an unbounded cache (the default policy)
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Look up the cached price for an item
    pub fn get(&self, item_id: &str) -> Option<Decimal> {
        self.prices.get(item_id).map(|entry| *entry.value())
    }

    /// Store a price for an item
    ///
    /// Updates an existing entry unconditionally. New entries are dropped
    /// once a configured bound is reached.
    pub fn insert(&self, item_id: &str, price: Decimal) {
        if let Some(capacity) = self.capacity {
            if !self.prices.contains_key(item_id) && self.prices.len() >= capacity {
                return;
            }
        }
        self.prices.insert(item_id.to_string(), price);
    }

    /// Number of cached prices
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::unbounded()
    }
}

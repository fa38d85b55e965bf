//! Order total calculation
//!
//! This module provides the `OrderCalculator` struct, which computes an
//! order's total as the exact sum of its item prices, consulting the shared
//! price cache on every item.
//!
//! # Price resolution
//!
//! For each item, the cached price wins. On a cache miss the item's own
//! embedded price is used and stored into the cache for later orders
//! (read-through). An item with no embedded price and no cached price fails
//! the order with an item error.
//!
//! Calculation is pure aside from the cache write, and the write is
//! idempotent: repeated calculations over the same item converge on the
//! same cached price.
//!
//! # Thread Safety
//!
//! The calculator holds only an `Arc<PriceCache>`; it can be shared across
//! worker tasks freely.

use crate::cache::PriceCache;
use crate::types::{Order, ProcessingError};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Computes order totals against the shared price cache
#[derive(Debug, Clone)]
pub struct OrderCalculator {
    prices: Arc<PriceCache>,
}

impl OrderCalculator {
    /// Create a calculator over the given price cache
    pub fn new(prices: Arc<PriceCache>) -> Self {
        Self { prices }
    }

    /// Compute the exact total of an order's item prices
    ///
    /// Addition is checked; an overflowing total rejects the order rather
    /// than wrapping.
    ///
    /// # Errors
    ///
    /// * `ProcessingError::UnpricedItem` - an item has no embedded price and
    ///   no cached price
    /// * `ProcessingError::TotalOverflow` - the sum exceeded the numeric range
    pub fn compute_total(&self, order: &Order) -> Result<Decimal, ProcessingError> {
        let mut total = Decimal::ZERO;

        for item in &order.items {
            let price = match self.prices.get(&item.id) {
                Some(cached) => cached,
                None => match item.price {
                    Some(embedded) => {
                        self.prices.insert(&item.id, embedded);
                        embedded
                    }
                    None => return Err(ProcessingError::unpriced_item(order.id, &item.id)),
                },
            };

            total = total
                .checked_add(price)
                .ok_or_else(|| ProcessingError::total_overflow(order.id))?;
        }

        Ok(total)
    }
}

//! Order and item types for the Order Batch Engine
//!
//! This module defines the input domain types submitted to the engine.
//! Orders are immutable once submitted; the engine never mutates them.

use rust_decimal::Decimal;

/// Order identifier
///
/// Caller-supplied and expected to be unique per order. Duplicates within a
/// single processing call are detected and collapsed by the scheduler.
pub type OrderId = u64;

/// Item identifier
///
/// Items are shared across orders; the price cache is keyed by this id.
pub type ItemId = String;

/// A single line item within an order
///
/// The price is optional: input data may omit it or carry an unparseable
/// value. A missing price is not an input error by itself - the calculator
/// can still resolve it from the price cache if another order already
/// supplied a price for the same item id.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Item identifier, used as the price cache key
    pub id: ItemId,

    /// Unit price, if the input carried a parseable value
    pub price: Option<Decimal>,
}

impl Item {
    /// Create an item with a known unit price
    pub fn priced(id: impl Into<ItemId>, price: Decimal) -> Self {
        Self {
            id: id.into(),
            price: Some(price),
        }
    }

    /// Create an item without a price (resolved via the price cache, if possible)
    pub fn unpriced(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            price: None,
        }
    }
}

/// An order submitted for processing
///
/// Immutable once submitted to the engine. An order with no items is valid
/// and computes to a zero total.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    /// Unique order identifier
    pub id: OrderId,

    /// Ordered sequence of line items
    pub items: Vec<Item>,
}

impl Order {
    /// Create an order from an id and its items
    pub fn new(id: OrderId, items: Vec<Item>) -> Self {
        Self { id, items }
    }
}

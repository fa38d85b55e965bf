//! Order validation
//!
//! Structural well-formedness checks, invoked once per order before any
//! calculation or persistence is attempted. A validation failure
//! short-circuits the order: it is recorded as failed and never reaches the
//! calculator or the store.
//!
//! The typed [`Order`](crate::types::Order) constructors already guarantee
//! an identifier and an item sequence, so the checks that remain live here:
//! no item may carry a negative unit price. An item with *no* price is not
//! rejected - the calculator may still resolve it through the price cache,
//! and classifies it as an item error only when the cache cannot supply a
//! price either.

use crate::types::{Order, ProcessingError};
use rust_decimal::Decimal;

/// Validate an order's structure
///
/// Pure; no side effects. Returns the first violation found.
pub fn validate(order: &Order) -> Result<(), ProcessingError> {
    for item in &order.items {
        if let Some(price) = item.price {
            if price < Decimal::ZERO {
                return Err(ProcessingError::negative_price(order.id, &item.id, price));
            }
        }
    }
    Ok(())
}

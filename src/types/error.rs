//! Error types for the Order Batch Engine
//!
//! This module defines the two error channels of the engine:
//!
//! - [`ProcessingError`] - per-order failures. These are always contained at
//!   the order level: the failed order is recorded and processing continues
//!   with the remaining orders.
//! - [`SystemicError`] - call-level failures outside the scope of any single
//!   order (transaction lifecycle failures, dead worker tasks). These abort
//!   the whole processing call and roll back the transaction.
//!
//! Per-order errors carry an [`ErrorKind`] classification used by the error
//! collector and the CSV output.

use crate::types::{ItemId, OrderId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Classification of a per-order failure
///
/// Persistence failures are the only retried class; validation and item
/// failures are recorded immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Structurally malformed order or item
    Validation,
    /// Missing or unresolvable price data
    Item,
    /// Save failure that survived all retry attempts
    Persistence,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Item => write!(f, "item"),
            ErrorKind::Persistence => write!(f, "persistence"),
        }
    }
}

/// Per-order processing failure
///
/// Each variant includes enough context to produce a useful failure record
/// without access to the original order.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProcessingError {
    /// An item carried a negative unit price
    ///
    /// Caught by the validator before any calculation or persistence is
    /// attempted for the order.
    #[error("order {order}: negative price {price} for item '{item}'")]
    NegativePrice {
        /// Order the item belongs to
        order: OrderId,
        /// Offending item id
        item: ItemId,
        /// The negative price as parsed
        price: Decimal,
    },

    /// An item has no price and the price cache cannot supply one
    ///
    /// Raised by the calculator on a cache miss for an item whose own price
    /// field is absent or was unparseable.
    #[error("order {order}: no price available for item '{item}'")]
    UnpricedItem {
        /// Order the item belongs to
        order: OrderId,
        /// Item with no resolvable price
        item: ItemId,
    },

    /// Summing item prices overflowed the numeric type
    ///
    /// The order is rejected to keep totals exact.
    #[error("order {order}: total overflowed while summing item prices")]
    TotalOverflow {
        /// Order whose total overflowed
        order: OrderId,
    },

    /// The persistence layer rejected the save on every attempt
    ///
    /// Only produced after the retry budget is exhausted; carries the message
    /// of the final attempt's failure.
    #[error("order {order}: save failed after {attempts} attempts: {message}")]
    SaveFailed {
        /// Order whose save failed
        order: OrderId,
        /// Number of attempts made (retries included)
        attempts: u32,
        /// Failure message from the final attempt
        message: String,
    },
}

impl ProcessingError {
    /// Classify this error for failure records and reporting
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProcessingError::NegativePrice { .. } => ErrorKind::Validation,
            ProcessingError::UnpricedItem { .. } | ProcessingError::TotalOverflow { .. } => {
                ErrorKind::Item
            }
            ProcessingError::SaveFailed { .. } => ErrorKind::Persistence,
        }
    }

    /// Create a NegativePrice error
    pub fn negative_price(order: OrderId, item: &str, price: Decimal) -> Self {
        ProcessingError::NegativePrice {
            order,
            item: item.to_string(),
            price,
        }
    }

    /// Create an UnpricedItem error
    pub fn unpriced_item(order: OrderId, item: &str) -> Self {
        ProcessingError::UnpricedItem {
            order,
            item: item.to_string(),
        }
    }

    /// Create a TotalOverflow error
    pub fn total_overflow(order: OrderId) -> Self {
        ProcessingError::TotalOverflow { order }
    }

    /// Create a SaveFailed error
    pub fn save_failed(order: OrderId, attempts: u32, message: impl Into<String>) -> Self {
        ProcessingError::SaveFailed {
            order,
            attempts,
            message: message.into(),
        }
    }
}

/// Call-level failure outside the scope of any single order
///
/// A systemic error aborts the whole processing call: accumulated results
/// are discarded, the transaction is rolled back, and the error propagates
/// to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SystemicError {
    /// The transaction could not be opened
    #[error("failed to open transaction: {message}")]
    TransactionOpen {
        /// Store failure message
        message: String,
    },

    /// The terminal commit failed
    #[error("failed to commit transaction: {message}")]
    TransactionCommit {
        /// Store failure message
        message: String,
    },

    /// The rollback itself failed
    ///
    /// The triggering error is logged before the rollback is attempted, so
    /// both failures remain visible.
    #[error("failed to roll back transaction: {message}")]
    TransactionRollback {
        /// Store failure message
        message: String,
    },

    /// A transaction lifecycle operation was attempted in the wrong state
    #[error("invalid transaction transition: {op} while {state}")]
    InvalidTransition {
        /// Operation that was attempted
        op: &'static str,
        /// State the coordinator was in
        state: &'static str,
    },

    /// A worker task died without producing results
    ///
    /// Worker panics are not per-order failures; losing a worker means an
    /// unknown number of orders have no result, so the call cannot succeed.
    #[error("worker task failed: {message}")]
    WorkerFailed {
        /// Join failure message
        message: String,
    },
}

impl SystemicError {
    /// Create a TransactionOpen error
    pub fn transaction_open(message: impl Into<String>) -> Self {
        SystemicError::TransactionOpen {
            message: message.into(),
        }
    }

    /// Create a TransactionCommit error
    pub fn transaction_commit(message: impl Into<String>) -> Self {
        SystemicError::TransactionCommit {
            message: message.into(),
        }
    }

    /// Create a TransactionRollback error
    pub fn transaction_rollback(message: impl Into<String>) -> Self {
        SystemicError::TransactionRollback {
            message: message.into(),
        }
    }

    /// Create a WorkerFailed error
    pub fn worker_failed(message: impl Into<String>) -> Self {
        SystemicError::WorkerFailed {
            message: message.into(),
        }
    }
}

//! Processing result types
//!
//! A [`ProcessingResult`] pairs an order id with the outcome of processing
//! it, mirroring the per-unit result shape used throughout the scheduler:
//! a computed total on success, a contained [`ProcessingError`] on failure.
//! Results are created once per order per call and never mutated; a
//! reprocessing call supersedes them with new results.

use crate::types::{ErrorKind, OrderId, ProcessingError};
use rust_decimal::Decimal;

/// Outcome of processing a single order
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingResult {
    /// The order this result belongs to
    pub order_id: OrderId,

    /// Computed total on success, contained error on failure
    pub outcome: Result<Decimal, ProcessingError>,
}

impl ProcessingResult {
    /// Create a success result with the computed total
    pub fn success(order_id: OrderId, total: Decimal) -> Self {
        Self {
            order_id,
            outcome: Ok(total),
        }
    }

    /// Create a failure result carrying the contained error
    pub fn failure(order_id: OrderId, error: ProcessingError) -> Self {
        Self {
            order_id,
            outcome: Err(error),
        }
    }

    /// Whether processing succeeded
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The computed total, present only on success
    pub fn total(&self) -> Option<Decimal> {
        self.outcome.as_ref().ok().copied()
    }

    /// The contained error, present only on failure
    pub fn error(&self) -> Option<&ProcessingError> {
        self.outcome.as_ref().err()
    }
}

/// Structured failure record accumulated by the error collector
///
/// Snapshot of a contained per-order failure, usable for the final report
/// and for forwarding to the logging layer.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureRecord {
    /// Order that failed
    pub order_id: OrderId,

    /// Failure classification
    pub kind: ErrorKind,

    /// Human-readable failure message
    pub message: String,
}

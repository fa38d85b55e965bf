//! Per-order failure collection
//!
//! Contained per-order failures are recorded here as structured
//! [`FailureRecord`]s for the final report, and each record is forwarded to
//! the logging layer as it arrives (fire-and-forget; nothing is read back
//! from the log).

use crate::types::{FailureRecord, OrderId, ProcessingError};
use std::sync::{Mutex, MutexGuard};

/// Accumulates failure records across all workers of a processing call
///
/// # Thread Safety
///
/// Append-only under a mutex; workers only push, the engine reads the
/// snapshot after dispatch completes.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    records: Mutex<Vec<FailureRecord>>,
}

impl ErrorCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a contained per-order failure and forward it to the log
    pub fn record(&self, order_id: OrderId, error: &ProcessingError) {
        let record = FailureRecord {
            order_id,
            kind: error.kind(),
            message: error.to_string(),
        };

        tracing::warn!(
            order = record.order_id,
            kind = %record.kind,
            "{}", record.message
        );

        self.lock().push(record);
    }

    /// Snapshot of all records collected so far
    pub fn records(&self) -> Vec<FailureRecord> {
        self.lock().clone()
    }

    /// Number of failures recorded
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no failures were recorded
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<FailureRecord>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

//! Persistence gateway with retry and exponential backoff
//!
//! This module provides the `PersistenceGateway` struct, which wraps the
//! external store's save operation in a bounded retry loop. Between
//! attempts the gateway sleeps for `base * 2^attempt` (attempt counted from
//! 1), so with the default 100ms base a three-attempt save sleeps 200ms and
//! then 400ms.
//!
//! Every failed save is eligible for retry: the gateway deliberately does
//! not consult the store's error classification, so a rejected write and a
//! transient outage consume the same retry budget. Only after the final
//! attempt fails does the error surface, as a per-order persistence
//! failure - never as a call-level error.
//!
//! The backoff sleep suspends only the worker running this order; other
//! orders keep processing.

use crate::store::{OrderStore, TxHandle};
use crate::types::{OrderId, ProcessingError};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

// Caps the backoff shift so the multiplier stays in u32 range.
const MAX_BACKOFF_SHIFT: u32 = 16;

/// Retrying wrapper around the external save operation
#[derive(Clone)]
pub struct PersistenceGateway {
    store: Arc<dyn OrderStore>,
    max_retries: u32,
    backoff_base: Duration,
}

impl PersistenceGateway {
    /// Create a gateway over the given store
    ///
    /// `max_retries` is the total attempt budget; zero is clamped to a
    /// single attempt. `backoff_base` is the unit the exponential delay
    /// grows from.
    pub fn new(store: Arc<dyn OrderStore>, max_retries: u32, backoff_base: Duration) -> Self {
        Self {
            store,
            max_retries: max_retries.max(1),
            backoff_base,
        }
    }

    /// Save an order total, retrying failed attempts with backoff
    ///
    /// # Errors
    ///
    /// `ProcessingError::SaveFailed` once all attempts are exhausted,
    /// carrying the final attempt's failure message.
    pub async fn save_with_retry(
        &self,
        order_id: OrderId,
        total: Decimal,
        tx: &TxHandle,
    ) -> Result<(), ProcessingError> {
        let mut attempt = 1u32;

        loop {
            match self.store.save(order_id, total, tx).await {
                Ok(()) => return Ok(()),
                Err(err) if attempt < self.max_retries => {
                    let delay = self.backoff_base * (1u32 << attempt.min(MAX_BACKOFF_SHIFT));
                    tracing::debug!(
                        order = order_id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "save failed, backing off before retry"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    return Err(ProcessingError::save_failed(
                        order_id,
                        attempt,
                        err.to_string(),
                    ));
                }
            }
        }
    }
}

impl std::fmt::Debug for PersistenceGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceGateway")
            .field("max_retries", &self.max_retries)
            .field("backoff_base", &self.backoff_base)
            .finish()
    }
}

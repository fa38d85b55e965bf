//! Batch scheduling and dispatch
//!
//! This module provides the `BatchScheduler` struct, which drives the
//! processing call: it partitions the input into fixed-size batches,
//! dispatches batches concurrently (bounded), and within each batch
//! dispatches every order as its own task.
//!
//! # Per-order flow
//!
//! 1. Atomically claim the order id in the dedup set; a lost claim means a
//!    duplicate, which is skipped without emitting a result.
//! 2. Serve a cached result if one exists - this bypasses validation,
//!    calculation, and persistence entirely.
//! 3. Otherwise validate → calculate → persist. A success is stored in the
//!    result cache; any failure is recorded by the error collector. Either
//!    way processing continues with the remaining orders.
//!
//! No ordering is guaranteed between orders or between batches; each
//! order's result is still deterministic given the same cache state.
//!
//! # Thread Safety
//!
//! The scheduler is cloneable and shares all state through `Arc`, the same
//! shape the engine's other components use. The dedup set is claimed with
//! `DashSet::insert`, whose return value makes check-then-insert a single
//! atomic step: of two workers racing on the same duplicate id, exactly one
//! proceeds.

use crate::cache::ResultCache;
use crate::core::error_collector::ErrorCollector;
use crate::core::persistence::PersistenceGateway;
use crate::core::validator::validate;
use crate::core::OrderCalculator;
use crate::store::TxHandle;
use crate::types::{Order, OrderId, ProcessingError, ProcessingResult, SystemicError};
use dashmap::DashSet;
use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Drives batched, parallel order processing for one call
#[derive(Debug, Clone)]
pub struct BatchScheduler {
    calculator: Arc<OrderCalculator>,
    gateway: Arc<PersistenceGateway>,
    results: Arc<ResultCache>,
    collector: Arc<ErrorCollector>,

    /// Order ids claimed in this call; scoped to the scheduler's lifetime
    claimed: Arc<DashSet<OrderId>>,

    batch_size: usize,
    max_concurrent_batches: usize,
}

impl BatchScheduler {
    /// Create a scheduler for one processing call
    ///
    /// The dedup set is created here and dies with the scheduler, which
    /// gives it call scope. Zero sizes are clamped to one.
    pub fn new(
        calculator: Arc<OrderCalculator>,
        gateway: Arc<PersistenceGateway>,
        results: Arc<ResultCache>,
        collector: Arc<ErrorCollector>,
        batch_size: usize,
        max_concurrent_batches: usize,
    ) -> Self {
        Self {
            calculator,
            gateway,
            results,
            collector,
            claimed: Arc::new(DashSet::new()),
            batch_size: batch_size.max(1),
            max_concurrent_batches: max_concurrent_batches.max(1),
        }
    }

    /// Partition orders into batches of at most the configured size
    ///
    /// Produces `ceil(N / batch_size)` batches; membership preserves input
    /// contiguity (orders stay next to their input neighbors).
    pub fn partition(&self, orders: Vec<Order>) -> Vec<Vec<Order>> {
        let mut batches = Vec::with_capacity(orders.len().div_ceil(self.batch_size));
        let mut batch = Vec::with_capacity(self.batch_size);

        for order in orders {
            batch.push(order);
            if batch.len() == self.batch_size {
                batches.push(std::mem::take(&mut batch));
            }
        }
        if !batch.is_empty() {
            batches.push(batch);
        }

        batches
    }

    /// Process all orders against the shared transaction handle
    ///
    /// Batches run concurrently up to `max_concurrent_batches`; each batch
    /// fans out its orders as individual tasks. Per-order failures are
    /// contained in the returned results.
    ///
    /// # Errors
    ///
    /// `SystemicError::WorkerFailed` if a worker task dies - losing a worker
    /// leaves orders without results, so the whole call must fail.
    pub async fn dispatch(
        &self,
        orders: Vec<Order>,
        tx: &TxHandle,
    ) -> Result<Vec<ProcessingResult>, SystemicError> {
        let batches = self.partition(orders);
        let tx = *tx;
        tracing::debug!(batches = batches.len(), "dispatching batches");

        let scheduler = self.clone();
        let mut stream = stream::iter(batches)
            .map(move |batch| {
                let scheduler = scheduler.clone();
                async move {
                    tokio::spawn(async move { scheduler.process_batch(batch, tx).await }).await
                }
            })
            .buffer_unordered(self.max_concurrent_batches);

        let mut results = Vec::new();
        while let Some(joined) = stream.next().await {
            match joined {
                Ok(batch_results) => results.extend(batch_results?),
                Err(err) => return Err(SystemicError::worker_failed(err.to_string())),
            }
        }

        Ok(results)
    }

    /// Process one batch, fanning out every order as its own task
    async fn process_batch(
        &self,
        batch: Vec<Order>,
        tx: TxHandle,
    ) -> Result<Vec<ProcessingResult>, SystemicError> {
        let mut tasks = Vec::with_capacity(batch.len());
        for order in batch {
            let scheduler = self.clone();
            tasks.push(tokio::spawn(
                async move { scheduler.process_order(order, tx).await },
            ));
        }

        let mut results = Vec::with_capacity(tasks.len());
        for task in tasks {
            match task.await {
                Ok(Some(result)) => results.push(result),
                Ok(None) => {} // duplicate id, no result emitted
                Err(err) => return Err(SystemicError::worker_failed(err.to_string())),
            }
        }

        Ok(results)
    }

    /// Process a single order; `None` means a duplicate was skipped
    async fn process_order(&self, order: Order, tx: TxHandle) -> Option<ProcessingResult> {
        // Atomic claim: at most one worker proceeds per order id per call.
        if !self.claimed.insert(order.id) {
            tracing::debug!(order = order.id, "duplicate order id skipped");
            return None;
        }

        // A cached result bypasses validation, calculation, and persistence.
        if let Some(cached) = self.results.get(order.id) {
            tracing::debug!(order = order.id, "served from result cache");
            return Some(cached);
        }

        Some(match self.run_pipeline(&order, &tx).await {
            Ok(total) => {
                let result = ProcessingResult::success(order.id, total);
                self.results.put(result.clone());
                result
            }
            Err(error) => {
                self.collector.record(order.id, &error);
                ProcessingResult::failure(order.id, error)
            }
        })
    }

    async fn run_pipeline(
        &self,
        order: &Order,
        tx: &TxHandle,
    ) -> Result<Decimal, ProcessingError> {
        validate(order)?;
        let total = self.calculator.compute_total(order)?;
        self.gateway.save_with_retry(order.id, total, tx).await?;
        Ok(total)
    }
}

//! Order processing orchestration
//!
//! This module provides the `OrderEngine` struct, the engine's sole entry
//! point. A processing call brackets the batch dispatch with the
//! transaction lifecycle:
//!
//! 1. Empty input returns an empty result collection without opening a
//!    transaction.
//! 2. Otherwise a transaction is opened, the scheduler dispatches all
//!    batches against the shared handle, and the transaction commits once
//!    dispatch completes - per-order failures are already contained in the
//!    results and do not prevent commit.
//! 3. A systemic error aborts the call: accumulated results are discarded,
//!    the transaction rolls back, and the error propagates to the caller.
//!
//! # Cache lifecycles
//!
//! The engine owns one price cache and one result cache. Each can be scoped
//! per engine (shared across calls) or per call (created fresh for every
//! `process` invocation); the dedup set is always per call. Defaults:
//! result cache per call, price cache per engine.

use crate::cache::{PriceCache, ResultCache};
use crate::core::coordinator::TransactionCoordinator;
use crate::core::error_collector::ErrorCollector;
use crate::core::persistence::PersistenceGateway;
use crate::core::scheduler::BatchScheduler;
use crate::core::OrderCalculator;
use crate::store::OrderStore;
use crate::types::{Order, ProcessingResult, SystemicError};
use std::sync::Arc;
use std::time::Duration;

/// Lifetime of a cache relative to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheScope {
    /// Fresh cache per `process` call
    Call,
    /// One cache for the engine's lifetime, shared across calls
    Engine,
}

/// Configuration for the order engine
///
/// All fields have defaults; zero values are replaced with the defaults (a
/// warning is logged) so a misconfigured engine still runs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Orders per batch
    pub batch_size: usize,

    /// Maximum number of batches processing concurrently
    pub max_concurrent_batches: usize,

    /// Save attempts per order before recording a persistence failure
    pub max_retries: u32,

    /// Base unit of the exponential backoff between save attempts
    pub backoff_base: Duration,

    /// LRU capacity of the result cache
    pub result_cache_capacity: usize,

    /// Optional entry bound on the price cache (unbounded when `None`)
    pub price_cache_capacity: Option<usize>,

    /// Result cache lifetime (default: per call)
    pub result_cache_scope: CacheScope,

    /// Price cache lifetime (default: per engine)
    pub price_cache_scope: CacheScope,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            max_concurrent_batches: num_cpus::get(),
            max_retries: 3,
            backoff_base: Duration::from_millis(100),
            result_cache_capacity: 1000,
            price_cache_capacity: None,
            result_cache_scope: CacheScope::Call,
            price_cache_scope: CacheScope::Engine,
        }
    }
}

impl EngineConfig {
    /// Replace zero values with defaults, logging a warning for each
    pub fn sanitized(mut self) -> Self {
        let default = Self::default();

        if self.batch_size == 0 {
            tracing::warn!(
                "invalid batch_size (0), using default ({})",
                default.batch_size
            );
            self.batch_size = default.batch_size;
        }
        if self.max_concurrent_batches == 0 {
            tracing::warn!(
                "invalid max_concurrent_batches (0), using default ({})",
                default.max_concurrent_batches
            );
            self.max_concurrent_batches = default.max_concurrent_batches;
        }
        if self.max_retries == 0 {
            tracing::warn!(
                "invalid max_retries (0), using default ({})",
                default.max_retries
            );
            self.max_retries = default.max_retries;
        }
        if self.result_cache_capacity == 0 {
            tracing::warn!(
                "invalid result_cache_capacity (0), using default ({})",
                default.result_cache_capacity
            );
            self.result_cache_capacity = default.result_cache_capacity;
        }

        self
    }
}

/// The order batch processing engine
///
/// Owns the caches and the store connection; each `process` call builds its
/// own coordinator, scheduler, and error collector, so an engine can be
/// called repeatedly (results superseding earlier ones) and shared behind
/// an `Arc`.
pub struct OrderEngine {
    store: Arc<dyn OrderStore>,
    config: EngineConfig,
    price_cache: Arc<PriceCache>,
    result_cache: Arc<ResultCache>,
}

impl OrderEngine {
    /// Create an engine over the given store
    pub fn new(store: Arc<dyn OrderStore>, config: EngineConfig) -> Self {
        let config = config.sanitized();
        let price_cache = Arc::new(PriceCache::new(config.price_cache_capacity));
        let result_cache = Arc::new(ResultCache::new(config.result_cache_capacity));

        Self {
            store,
            config,
            price_cache,
            result_cache,
        }
    }

    /// The engine-scoped price cache
    pub fn price_cache(&self) -> &Arc<PriceCache> {
        &self.price_cache
    }

    /// The engine-scoped result cache
    pub fn result_cache(&self) -> &Arc<ResultCache> {
        &self.result_cache
    }

    /// The active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Process a collection of orders into one result per distinct order id
    ///
    /// Synchronous from the caller's perspective: resolves once every order
    /// has a result. Output ordering is not guaranteed to match the input.
    ///
    /// # Errors
    ///
    /// Only a [`SystemicError`] surfaces here; all per-order failures are
    /// contained inside the returned results.
    pub async fn process(
        &self,
        orders: Vec<Order>,
    ) -> Result<Vec<ProcessingResult>, SystemicError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let price_cache = match self.config.price_cache_scope {
            CacheScope::Engine => Arc::clone(&self.price_cache),
            CacheScope::Call => Arc::new(PriceCache::new(self.config.price_cache_capacity)),
        };
        let result_cache = match self.config.result_cache_scope {
            CacheScope::Engine => Arc::clone(&self.result_cache),
            CacheScope::Call => Arc::new(ResultCache::new(self.config.result_cache_capacity)),
        };

        let mut coordinator = TransactionCoordinator::new(Arc::clone(&self.store));
        let tx = coordinator.open().await?;

        let collector = Arc::new(ErrorCollector::new());
        let scheduler = BatchScheduler::new(
            Arc::new(OrderCalculator::new(price_cache)),
            Arc::new(PersistenceGateway::new(
                Arc::clone(&self.store),
                self.config.max_retries,
                self.config.backoff_base,
            )),
            Arc::clone(&result_cache),
            Arc::clone(&collector),
            self.config.batch_size,
            self.config.max_concurrent_batches,
        );

        match scheduler.dispatch(orders, &tx).await {
            Ok(results) => {
                if let Err(error) = coordinator.commit().await {
                    tracing::error!(%error, "commit failed, rolling back transaction");
                    if let Err(rollback_error) = coordinator.rollback().await {
                        tracing::error!(%rollback_error, "rollback failed");
                    }
                    return Err(error);
                }
                let stats = result_cache.stats();
                tracing::info!(
                    results = results.len(),
                    failures = collector.len(),
                    cache_hits = stats.hits,
                    "processing call committed"
                );
                Ok(results)
            }
            Err(error) => {
                tracing::error!(%error, "systemic failure, rolling back transaction");
                if let Err(rollback_error) = coordinator.rollback().await {
                    tracing::error!(%rollback_error, "rollback failed");
                }
                Err(error)
            }
        }
    }
}

impl std::fmt::Debug for OrderEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderEngine")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryOrderStore;
    use crate::types::Item;
    use rust_decimal::Decimal;

    fn engine_with(config: EngineConfig) -> (Arc<InMemoryOrderStore>, OrderEngine) {
        let store = Arc::new(InMemoryOrderStore::new());
        let engine = OrderEngine::new(Arc::clone(&store) as Arc<dyn OrderStore>, config);
        (store, engine)
    }

    fn priced_order(id: u64, price_cents: i64) -> Order {
        Order::new(
            id,
            vec![Item::priced(format!("item-{id}"), Decimal::new(price_cents, 2))],
        )
    }

    #[tokio::test]
    async fn test_empty_input_opens_no_transaction() {
        let (store, engine) = engine_with(EngineConfig::default());

        let results = engine.process(Vec::new()).await.unwrap();

        assert!(results.is_empty());
        assert_eq!(store.open_transactions(), 0);
        assert_eq!(store.committed_count(), 0);
    }

    #[tokio::test]
    async fn test_successful_call_commits_totals() {
        let (store, engine) = engine_with(EngineConfig::default());

        let results = engine
            .process(vec![priced_order(1, 1000), priced_order(2, 500)])
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(store.committed_total(1), Some(Decimal::new(1000, 2)));
        assert_eq!(store.committed_total(2), Some(Decimal::new(500, 2)));
        assert_eq!(store.open_transactions(), 0);
    }

    #[tokio::test]
    async fn test_per_order_failures_still_commit() {
        let (store, engine) = engine_with(EngineConfig::default());

        let results = engine
            .process(vec![
                priced_order(1, 1000),
                Order::new(2, vec![Item::unpriced("mystery")]),
            ])
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(store.committed_count(), 1);
        assert_eq!(store.committed_total(1), Some(Decimal::new(1000, 2)));
    }

    #[tokio::test]
    async fn test_open_failure_aborts_call() {
        let (store, engine) = engine_with(EngineConfig::default());
        store.fail_open();

        let err = engine.process(vec![priced_order(1, 100)]).await.unwrap_err();
        assert!(matches!(err, SystemicError::TransactionOpen { .. }));
        assert_eq!(store.committed_count(), 0);
    }

    #[tokio::test]
    async fn test_commit_failure_is_systemic() {
        let (store, engine) = engine_with(EngineConfig::default());
        store.fail_commit();

        let err = engine.process(vec![priced_order(1, 100)]).await.unwrap_err();
        assert!(matches!(err, SystemicError::TransactionCommit { .. }));
        assert_eq!(store.committed_count(), 0);
        // The failed transaction was rolled back, not left open
        assert_eq!(store.open_transactions(), 0);
    }

    #[tokio::test]
    async fn test_call_scoped_result_cache_recomputes_across_calls() {
        let (store, engine) = engine_with(EngineConfig::default());

        engine.process(vec![priced_order(1, 100)]).await.unwrap();
        engine.process(vec![priced_order(1, 100)]).await.unwrap();

        // Default scope is per call: the second call saved again
        assert_eq!(store.save_attempts(1), 2);
    }

    #[tokio::test]
    async fn test_engine_scoped_result_cache_serves_second_call() {
        let config = EngineConfig {
            result_cache_scope: CacheScope::Engine,
            ..EngineConfig::default()
        };
        let (store, engine) = engine_with(config);

        let first = engine.process(vec![priced_order(1, 100)]).await.unwrap();
        let second = engine.process(vec![priced_order(1, 100)]).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.save_attempts(1), 1);
    }

    #[tokio::test]
    async fn test_price_cache_shared_across_calls_by_default() {
        let (_store, engine) = engine_with(EngineConfig::default());

        engine
            .process(vec![Order::new(1, vec![Item::priced("a", Decimal::TEN)])])
            .await
            .unwrap();

        // Second call prices the same item without an embedded price
        let results = engine
            .process(vec![Order::new(2, vec![Item::unpriced("a")])])
            .await
            .unwrap();

        assert_eq!(results[0].total(), Some(Decimal::TEN));
    }

    #[test]
    fn test_sanitized_replaces_zero_values() {
        let config = EngineConfig {
            batch_size: 0,
            max_concurrent_batches: 0,
            max_retries: 0,
            result_cache_capacity: 0,
            ..EngineConfig::default()
        }
        .sanitized();

        assert_eq!(config.batch_size, 100);
        assert_eq!(config.max_concurrent_batches, num_cpus::get());
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.result_cache_capacity, 1000);
    }
}

//! Engine integration tests
//!
//! These tests exercise the full processing pipeline through the public
//! `OrderEngine` API against the in-memory store: deduplication, cache
//! transparency, idempotence across calls, batch partitioning behavior,
//! retry backoff, partial failure containment, and systemic rollback.

use order_batch_engine::store::OrderStore;
use order_batch_engine::{
    CacheScope, EngineConfig, InMemoryOrderStore, Item, Order, OrderEngine, OrderId,
    ProcessingError, SystemicError,
};
use rstest::rstest;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn engine_with(config: EngineConfig) -> (Arc<InMemoryOrderStore>, OrderEngine) {
    let store = Arc::new(InMemoryOrderStore::new());
    let engine = OrderEngine::new(Arc::clone(&store) as Arc<dyn OrderStore>, config);
    (store, engine)
}

fn fast_config() -> EngineConfig {
    EngineConfig {
        backoff_base: Duration::from_millis(1),
        ..EngineConfig::default()
    }
}

fn priced_order(id: OrderId, cents: i64) -> Order {
    Order::new(
        id,
        vec![Item::priced(format!("item-{id}"), Decimal::new(cents, 2))],
    )
}

#[tokio::test]
async fn test_reference_scenario() {
    // Two orders: one with two priced items, one with no items
    let (store, engine) = engine_with(fast_config());

    let orders = vec![
        Order::new(
            1,
            vec![
                Item::priced("a", Decimal::new(10, 0)),
                Item::priced("b", Decimal::new(5, 0)),
            ],
        ),
        Order::new(2, vec![]),
    ];

    let mut results = engine.process(orders).await.unwrap();
    results.sort_by_key(|r| r.order_id);

    assert_eq!(results.len(), 2);
    assert!(results[0].is_success());
    assert_eq!(results[0].total(), Some(Decimal::new(15, 0)));
    assert!(results[1].is_success());
    assert_eq!(results[1].total(), Some(Decimal::ZERO));

    assert_eq!(store.committed_total(1), Some(Decimal::new(15, 0)));
    assert_eq!(store.committed_total(2), Some(Decimal::ZERO));
}

#[tokio::test]
async fn test_unpriced_item_fails_only_its_order() {
    // An unparseable price reaches the engine as an unpriced item; that
    // order fails with an item error while the rest of the call succeeds
    let (store, engine) = engine_with(fast_config());

    let orders = vec![
        priced_order(1, 1000),
        Order::new(2, vec![Item::unpriced("mystery")]),
        priced_order(3, 700),
    ];

    let mut results = engine.process(orders).await.unwrap();
    results.sort_by_key(|r| r.order_id);

    assert_eq!(results.len(), 3);
    assert!(results[0].is_success());
    assert_eq!(
        results[1].error(),
        Some(&ProcessingError::unpriced_item(2, "mystery"))
    );
    assert!(results[2].is_success());

    assert_eq!(store.committed_count(), 2);
    assert_eq!(store.committed_total(2), None);
}

#[tokio::test]
async fn test_duplicate_ids_yield_one_result() {
    // Two orders sharing identifier 7 in the same call
    let (store, engine) = engine_with(fast_config());

    let orders = vec![priced_order(7, 100), priced_order(7, 100)];
    let results = engine.process(orders).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].order_id, 7);
    assert_eq!(store.save_attempts(7), 1);
}

#[rstest]
#[case::many_duplicates(vec![1, 1, 1, 2, 2, 3], 3)]
#[case::all_same(vec![9, 9, 9, 9], 1)]
#[case::all_distinct(vec![1, 2, 3, 4], 4)]
#[tokio::test]
async fn test_one_result_per_distinct_id(
    #[case] ids: Vec<OrderId>,
    #[case] expected: usize,
) {
    let (_store, engine) = engine_with(fast_config());

    let orders: Vec<Order> = ids.iter().map(|&id| priced_order(id, 100)).collect();
    let results = engine.process(orders).await.unwrap();

    assert_eq!(results.len(), expected);
    let result_ids: HashSet<OrderId> = results.iter().map(|r| r.order_id).collect();
    let input_ids: HashSet<OrderId> = ids.into_iter().collect();
    assert_eq!(result_ids, input_ids);
}

#[tokio::test]
async fn test_totals_transparent_to_cache_state() {
    // The same orders priced through a cold cache and a warm one (items
    // shared across orders) produce identical totals
    let (_store, engine) = engine_with(fast_config());

    let orders = vec![
        Order::new(
            1,
            vec![
                Item::priced("a", Decimal::new(250, 2)),
                Item::priced("b", Decimal::new(175, 2)),
            ],
        ),
        // Same items again; priced from the cache this time
        Order::new(
            2,
            vec![
                Item::priced("a", Decimal::new(250, 2)),
                Item::priced("b", Decimal::new(175, 2)),
            ],
        ),
    ];

    let mut results = engine.process(orders).await.unwrap();
    results.sort_by_key(|r| r.order_id);

    assert_eq!(results[0].total(), results[1].total());
    assert_eq!(results[0].total(), Some(Decimal::new(425, 2)));
}

#[tokio::test]
async fn test_idempotent_reprocessing_with_shared_cache() {
    // With an engine-scoped result cache, the second call returns identical
    // results served from cache - nothing recomputed or re-persisted
    let config = EngineConfig {
        result_cache_scope: CacheScope::Engine,
        ..fast_config()
    };
    let (store, engine) = engine_with(config);

    let orders: Vec<Order> = (1..=10u64).map(|i| priced_order(i, 100 * i as i64)).collect();

    let mut first = engine.process(orders.clone()).await.unwrap();
    let mut second = engine.process(orders).await.unwrap();
    first.sort_by_key(|r| r.order_id);
    second.sort_by_key(|r| r.order_id);

    assert_eq!(first, second);
    for i in 1..=10u64 {
        assert_eq!(store.save_attempts(i), 1);
    }

    let stats = engine.result_cache().stats();
    assert_eq!(stats.hits, 10);
}

#[tokio::test]
async fn test_large_input_across_many_batches() {
    // 250 orders with batch size 100 → 3 batches; every order gets a result
    let config = EngineConfig {
        batch_size: 100,
        ..fast_config()
    };
    let (store, engine) = engine_with(config);

    let orders: Vec<Order> = (0..250u64).map(|i| priced_order(i, 100)).collect();
    let results = engine.process(orders).await.unwrap();

    assert_eq!(results.len(), 250);
    assert!(results.iter().all(|r| r.is_success()));
    assert_eq!(store.committed_count(), 250);
}

#[tokio::test(start_paused = true)]
async fn test_retry_succeeds_on_third_attempt() {
    // A save failing twice then succeeding yields a success result after
    // backoff sleeps of 200ms and 400ms (base 100ms)
    let config = EngineConfig {
        backoff_base: Duration::from_millis(100),
        ..EngineConfig::default()
    };
    let (store, engine) = engine_with(config);
    store.fail_next_saves(2);

    let started = tokio::time::Instant::now();
    let results = engine.process(vec![priced_order(1, 100)]).await.unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].is_success());
    assert_eq!(store.save_attempts(1), 3);
    assert_eq!(started.elapsed(), Duration::from_millis(600));
    assert_eq!(store.committed_total(1), Some(Decimal::new(100, 2)));
}

#[tokio::test]
async fn test_exhausted_retries_contained_per_order() {
    let (store, engine) = engine_with(fast_config());
    store.fail_order(2);

    let orders = vec![priced_order(1, 100), priced_order(2, 100), priced_order(3, 100)];
    let mut results = engine.process(orders).await.unwrap();
    results.sort_by_key(|r| r.order_id);

    assert!(results[0].is_success());
    assert!(matches!(
        results[1].error(),
        Some(ProcessingError::SaveFailed { attempts: 3, .. })
    ));
    assert!(results[2].is_success());

    // The failed order never reached the committed map; the rest did
    assert_eq!(store.committed_count(), 2);
}

#[tokio::test]
async fn test_negative_price_is_validation_failure() {
    let (store, engine) = engine_with(fast_config());

    let orders = vec![Order::new(
        1,
        vec![Item::priced("bad", Decimal::new(-500, 2))],
    )];
    let results = engine.process(orders).await.unwrap();

    assert_eq!(
        results[0].error(),
        Some(&ProcessingError::negative_price(
            1,
            "bad",
            Decimal::new(-500, 2)
        ))
    );
    // Validation short-circuits: no save was ever attempted
    assert_eq!(store.save_attempts(1), 0);
}

#[tokio::test]
async fn test_systemic_failure_rolls_back_everything() {
    // A commit failure aborts the call; no totals become visible even
    // though every order processed cleanly
    let (store, engine) = engine_with(fast_config());
    store.fail_commit();

    let orders: Vec<Order> = (0..20u64).map(|i| priced_order(i, 100)).collect();
    let err = engine.process(orders).await.unwrap_err();

    assert!(matches!(err, SystemicError::TransactionCommit { .. }));
    assert_eq!(store.committed_count(), 0);
    assert_eq!(store.open_transactions(), 0);
}

#[tokio::test]
async fn test_result_cache_eviction_is_lru() {
    // Capacity 3, engine scope. Orders are cached one call at a time so the
    // recency order is fixed: 1, then 2, then 3.
    let config = EngineConfig {
        result_cache_capacity: 3,
        result_cache_scope: CacheScope::Engine,
        ..fast_config()
    };
    let (store, engine) = engine_with(config);

    engine.process(vec![priced_order(1, 100)]).await.unwrap();
    engine.process(vec![priced_order(2, 200)]).await.unwrap();
    engine.process(vec![priced_order(3, 300)]).await.unwrap();

    // Refresh order 1's recency (cache hit), making 2 the least recently
    // used, then bring in a fourth entry to force an eviction
    engine.process(vec![priced_order(1, 100)]).await.unwrap();
    engine.process(vec![priced_order(4, 400)]).await.unwrap();

    // Orders 1, 3, 4 are cached; reprocessing them saves nothing new
    engine
        .process(vec![priced_order(1, 100), priced_order(3, 300), priced_order(4, 400)])
        .await
        .unwrap();
    assert_eq!(store.save_attempts(1), 1);
    assert_eq!(store.save_attempts(3), 1);
    assert_eq!(store.save_attempts(4), 1);

    // Order 2 was evicted, so it is recomputed and saved again
    engine.process(vec![priced_order(2, 200)]).await.unwrap();
    assert_eq!(store.save_attempts(2), 2);
}

#[tokio::test]
async fn test_empty_input() {
    let (store, engine) = engine_with(fast_config());

    let results = engine.process(Vec::new()).await.unwrap();

    assert!(results.is_empty());
    assert_eq!(store.open_transactions(), 0);
}

#[tokio::test]
async fn test_results_deterministic_under_concurrency() {
    // Many runs over the same input produce the same result set regardless
    // of scheduling order
    let orders: Vec<Order> = (0..50u64)
        .map(|i| {
            Order::new(
                i,
                vec![
                    Item::priced(format!("a-{}", i % 7), Decimal::new((i % 7) as i64 * 100, 2)),
                    Item::priced(format!("b-{}", i % 5), Decimal::new((i % 5) as i64 * 50, 2)),
                ],
            )
        })
        .collect();

    let mut reference: Option<Vec<(OrderId, Option<Decimal>)>> = None;
    for _ in 0..3 {
        let (_store, engine) = engine_with(fast_config());
        let mut results = engine.process(orders.clone()).await.unwrap();
        results.sort_by_key(|r| r.order_id);
        let snapshot: Vec<(OrderId, Option<Decimal>)> =
            results.iter().map(|r| (r.order_id, r.total())).collect();

        match &reference {
            Some(expected) => assert_eq!(&snapshot, expected),
            None => reference = Some(snapshot),
        }
    }
}

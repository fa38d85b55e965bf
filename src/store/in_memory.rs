//! In-memory transactional store
//!
//! Reference implementation of the [`OrderStore`] port backed by concurrent
//! maps. Writes are staged per transaction and only reach the committed map
//! on commit; rollback drops the staged writes, so partial work is never
//! visible.
//!
//! The store also supports scriptable save failures (a global
//! fail-the-next-N counter and per-order always-fail marks) so retry and
//! failure-containment behavior can be exercised deterministically. The CLI
//! uses this store as its backend; tests use it as a probe.

use crate::store::{OrderStore, StoreError, TxHandle};
use crate::types::OrderId;
use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

/// Concurrent in-memory implementation of [`OrderStore`]
///
/// # Thread Safety
///
/// All state lives in `DashMap`/atomic containers; the store can be shared
/// across any number of worker tasks without external locking.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    /// Totals visible after a commit
    committed: DashMap<OrderId, Decimal>,

    /// Writes staged per open transaction
    pending: DashMap<u64, Vec<(OrderId, Decimal)>>,

    /// Transaction id source
    next_tx: AtomicU64,

    /// Per-order save attempt counts, failures included
    attempts: DashMap<OrderId, u32>,

    /// Remaining saves to fail, regardless of order
    fail_next_saves: AtomicU32,

    /// Orders whose saves always fail
    fail_orders: DashSet<OrderId>,

    /// Whether the next open should fail
    fail_open: AtomicBool,

    /// Whether the next commit should fail
    fail_commit: AtomicBool,
}

impl InMemoryOrderStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` save calls fail with a transient error
    pub fn fail_next_saves(&self, count: u32) {
        self.fail_next_saves.store(count, Ordering::SeqCst);
    }

    /// Make every save for `order_id` fail with a transient error
    pub fn fail_order(&self, order_id: OrderId) {
        self.fail_orders.insert(order_id);
    }

    /// Make the next open call fail
    pub fn fail_open(&self) {
        self.fail_open.store(true, Ordering::SeqCst);
    }

    /// Make the next commit call fail
    pub fn fail_commit(&self) {
        self.fail_commit.store(true, Ordering::SeqCst);
    }

    /// How many save attempts were made for an order (failures included)
    pub fn save_attempts(&self, order_id: OrderId) -> u32 {
        self.attempts.get(&order_id).map(|e| *e.value()).unwrap_or(0)
    }

    /// The committed total for an order, if any
    pub fn committed_total(&self, order_id: OrderId) -> Option<Decimal> {
        self.committed.get(&order_id).map(|e| *e.value())
    }

    /// Number of committed orders
    pub fn committed_count(&self) -> usize {
        self.committed.len()
    }

    /// Number of transactions still open
    pub fn open_transactions(&self) -> usize {
        self.pending.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn open(&self) -> Result<TxHandle, StoreError> {
        if self.fail_open.swap(false, Ordering::SeqCst) {
            return Err(StoreError::transient("store unavailable"));
        }
        let id = self.next_tx.fetch_add(1, Ordering::SeqCst);
        self.pending.insert(id, Vec::new());
        Ok(TxHandle::new(id))
    }

    async fn save(
        &self,
        order_id: OrderId,
        total: Decimal,
        tx: &TxHandle,
    ) -> Result<(), StoreError> {
        *self.attempts.entry(order_id).or_insert(0) += 1;

        if self.fail_orders.contains(&order_id) {
            return Err(StoreError::transient("injected save failure"));
        }
        if self
            .fail_next_saves
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(StoreError::transient("injected save failure"));
        }

        match self.pending.get_mut(&tx.id()) {
            Some(mut staged) => {
                staged.push((order_id, total));
                Ok(())
            }
            None => Err(StoreError::UnknownTransaction { handle: tx.id() }),
        }
    }

    async fn commit(&self, tx: TxHandle) -> Result<(), StoreError> {
        if self.fail_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::transient("injected commit failure"));
        }
        match self.pending.remove(&tx.id()) {
            Some((_, staged)) => {
                for (order_id, total) in staged {
                    self.committed.insert(order_id, total);
                }
                Ok(())
            }
            None => Err(StoreError::UnknownTransaction { handle: tx.id() }),
        }
    }

    async fn rollback(&self, tx: TxHandle) -> Result<(), StoreError> {
        match self.pending.remove(&tx.id()) {
            Some(_) => Ok(()),
            None => Err(StoreError::UnknownTransaction { handle: tx.id() }),
        }
    }
}

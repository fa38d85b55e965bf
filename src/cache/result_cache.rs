//! Concurrency-safe processing-result cache
//!
//! Wraps the strict-LRU map in a mutex so worker tasks across batches can
//! share it, and counts hits and misses for end-of-call reporting.
//!
//! A cache hit serves the stored [`ProcessingResult`] directly, letting the
//! scheduler skip validation, calculation, and persistence for that order.

use crate::cache::lru::LruCache;
use crate::types::{OrderId, ProcessingResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Hit/miss counters snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the cache
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
}

/// Shared LRU cache of per-order processing results
///
/// # Thread Safety
///
/// All methods take `&self` and are safe to call from any number of worker
/// tasks. Strict LRU needs one global recency order, so the map sits behind
/// a single mutex rather than a sharded structure; the critical sections are
/// a hash lookup or insert.
#[derive(Debug)]
pub struct ResultCache {
    inner: Mutex<LruCache<OrderId, ProcessingResult>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    /// Create a result cache bounded at `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a cached result, marking it most-recently-used on a hit
    pub fn get(&self, order_id: OrderId) -> Option<ProcessingResult> {
        let result = self.lock().get(&order_id).cloned();
        match result {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        result
    }

    /// Insert or update the result for its order id, evicting the
    /// least-recently-used entry if over capacity
    pub fn put(&self, result: ProcessingResult) {
        self.lock().put(result.order_id, result);
    }

    /// Number of cached results
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of the hit/miss counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    // A poisoned mutex only means another worker panicked mid-access; the
    // map itself is still structurally sound, so recover the guard.
    fn lock(&self) -> MutexGuard<'_, LruCache<OrderId, ProcessingResult>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

//! Persistence port
//!
//! The engine persists computed totals through the [`OrderStore`] trait, the
//! boundary to the external transactional store. The store must supply
//! transactional semantics: writes staged through [`OrderStore::save`]
//! become visible only after [`OrderStore::commit`], and a rollback
//! discards them entirely.
//!
//! One transaction handle is issued per processing call; all workers share
//! it read-only, and only the transaction coordinator performs the terminal
//! commit or rollback.

pub mod in_memory;

pub use in_memory::InMemoryOrderStore;

use crate::types::OrderId;
use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

/// Opaque handle to an open transaction
///
/// Issued by [`OrderStore::open`] and valid until committed or rolled back.
/// Copyable so every worker task can carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHandle(u64);

impl TxHandle {
    /// Wrap a store-issued transaction id
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw transaction id
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Failure reported by the persistence backend
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The store could not complete the request right now
    #[error("transient store failure: {message}")]
    Transient {
        /// Backend failure message
        message: String,
    },

    /// The store refused the request outright
    ///
    /// The retry gateway does not treat this differently from a transient
    /// failure; the distinction exists so stores can report faithfully.
    #[error("store rejected the request: {message}")]
    Rejected {
        /// Backend rejection message
        message: String,
    },

    /// The transaction handle is not (or no longer) known to the store
    #[error("unknown transaction handle {handle}")]
    UnknownTransaction {
        /// The raw handle id
        handle: u64,
    },
}

impl StoreError {
    /// Create a Transient error
    pub fn transient(message: impl Into<String>) -> Self {
        StoreError::Transient {
            message: message.into(),
        }
    }

    /// Create a Rejected error
    pub fn rejected(message: impl Into<String>) -> Self {
        StoreError::Rejected {
            message: message.into(),
        }
    }
}

/// External transactional store for computed order totals
///
/// Implementations must be safe to share across worker tasks: `save` may be
/// called concurrently for different orders against the same handle.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Open a transaction and return its handle
    async fn open(&self) -> Result<TxHandle, StoreError>;

    /// Stage the total for an order inside the given transaction
    async fn save(
        &self,
        order_id: OrderId,
        total: Decimal,
        tx: &TxHandle,
    ) -> Result<(), StoreError>;

    /// Make all writes staged in the transaction visible
    async fn commit(&self, tx: TxHandle) -> Result<(), StoreError>;

    /// Discard all writes staged in the transaction
    async fn rollback(&self, tx: TxHandle) -> Result<(), StoreError>;
}

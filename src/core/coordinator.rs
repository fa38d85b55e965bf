//! Transaction coordination
//!
//! This module provides the `TransactionCoordinator` struct, which brackets
//! a processing call with the store's transaction lifecycle:
//!
//! ```text
//! Idle → Open → Committed
//!             ↘ RolledBack
//! ```
//!
//! `Open` is entered once per call, before any order is dispatched. Commit
//! is reached when the dispatch phase completes - per-order failures have
//! already been caught and recorded by the scheduler and do not prevent it.
//! Rollback is reached only when a systemic error escapes the per-order
//! handling; the caller then discards the accumulated results and the error
//! propagates.
//!
//! State only advances on success: a failed commit leaves the coordinator
//! `Open` so the caller can still roll back.

use crate::store::{OrderStore, TxHandle};
use crate::types::SystemicError;
use std::sync::Arc;

/// Transaction lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    /// No transaction yet
    Idle,
    /// Transaction open, workers may save against the handle
    Open,
    /// Terminal: staged writes are visible
    Committed,
    /// Terminal: staged writes were discarded
    RolledBack,
}

impl TxState {
    fn as_str(&self) -> &'static str {
        match self {
            TxState::Idle => "idle",
            TxState::Open => "open",
            TxState::Committed => "committed",
            TxState::RolledBack => "rolled back",
        }
    }
}

/// Brackets one processing call with open/commit/rollback
pub struct TransactionCoordinator {
    store: Arc<dyn OrderStore>,
    state: TxState,
    handle: Option<TxHandle>,
}

impl TransactionCoordinator {
    /// Create an idle coordinator over the given store
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self {
            store,
            state: TxState::Idle,
            handle: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> TxState {
        self.state
    }

    /// Open the transaction and return its shared handle
    ///
    /// Valid only from `Idle`.
    pub async fn open(&mut self) -> Result<TxHandle, SystemicError> {
        if self.state != TxState::Idle {
            return Err(SystemicError::InvalidTransition {
                op: "open",
                state: self.state.as_str(),
            });
        }

        let handle = self
            .store
            .open()
            .await
            .map_err(|err| SystemicError::transaction_open(err.to_string()))?;

        self.state = TxState::Open;
        self.handle = Some(handle);
        tracing::debug!(tx = handle.id(), "transaction opened");
        Ok(handle)
    }

    /// Commit the open transaction
    ///
    /// Valid only from `Open`. On failure the state is left `Open`.
    pub async fn commit(&mut self) -> Result<(), SystemicError> {
        let handle = self.open_handle("commit")?;
        self.store
            .commit(handle)
            .await
            .map_err(|err| SystemicError::transaction_commit(err.to_string()))?;

        self.state = TxState::Committed;
        tracing::debug!(tx = handle.id(), "transaction committed");
        Ok(())
    }

    /// Roll back the open transaction, discarding staged writes
    ///
    /// Valid only from `Open`. On failure the state is left `Open`.
    pub async fn rollback(&mut self) -> Result<(), SystemicError> {
        let handle = self.open_handle("rollback")?;
        self.store
            .rollback(handle)
            .await
            .map_err(|err| SystemicError::transaction_rollback(err.to_string()))?;

        self.state = TxState::RolledBack;
        tracing::debug!(tx = handle.id(), "transaction rolled back");
        Ok(())
    }

    fn open_handle(&self, op: &'static str) -> Result<TxHandle, SystemicError> {
        match (self.state, self.handle) {
            (TxState::Open, Some(handle)) => Ok(handle),
            _ => Err(SystemicError::InvalidTransition {
                op,
                state: self.state.as_str(),
            }),
        }
    }
}

impl std::fmt::Debug for TransactionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionCoordinator")
            .field("state", &self.state)
            .field("handle", &self.handle)
            .finish()
    }
}

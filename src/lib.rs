//! Order Batch Engine Library
//! # Overview
//!
//! This library provides a batched, parallel order processor: it ingests a
//! collection of orders and produces one result per distinct order id -
//! a computed total on success, a recorded failure otherwise - using
//! batching, bounded parallelism, caching, deduplication, and
//! retry-with-backoff around a transactional persistence step.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Order, Item, ProcessingResult, errors)
//! - [`cli`] - CLI arguments parsing
//! - [`cache`] - Shared caches:
//!   - [`cache::price_cache`] - read-through item-price cache
//!   - [`cache::result_cache`] - strict-LRU per-order result cache
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - Processing orchestration and configuration
//!   - [`core::scheduler`] - Batch partitioning and parallel dispatch
//!   - [`core::calculator`] - Order totals via the price cache
//!   - [`core::persistence`] - Retrying gateway around the external save
//!   - [`core::coordinator`] - Transaction lifecycle state machine
//! - [`store`] - The transactional persistence port and its in-memory
//!   reference implementation
//! - [`io`] - CSV ingestion and result output
//!
//! # Failure containment
//!
//! Per-order failures (validation, pricing, exhausted save retries) never
//! abort a call: they are recorded and the remaining orders keep
//! processing. The only caller-visible failure mode is a systemic error -
//! a failure outside per-order scope - which rolls back the transaction
//! and discards the call's results.

// Module declarations
pub mod cache;
pub mod cli;
pub mod core;
pub mod io;
pub mod store;
pub mod types;

pub use core::{CacheScope, EngineConfig, OrderEngine};
pub use io::write_results_csv;
pub use store::{InMemoryOrderStore, OrderStore, StoreError, TxHandle};
pub use types::{
    ErrorKind, FailureRecord, Item, ItemId, Order, OrderId, ProcessingError, ProcessingResult,
    SystemicError,
};

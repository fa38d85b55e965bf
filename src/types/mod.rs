//! Types module
//!
//! Core data types used throughout the order batch engine:
//! - `order` - Order and item input types
//! - `result` - Per-order processing results and failure records
//! - `error` - Per-order and call-level error taxonomies

pub mod error;
pub mod order;
pub mod result;

pub use error::{ErrorKind, ProcessingError, SystemicError};
pub use order::{Item, ItemId, Order, OrderId};
pub use result::{FailureRecord, ProcessingResult};

//! I/O handling
//!
//! - `csv_format` - CSV row structures, order grouping, result output
//! - `async_reader` - streaming batched order ingestion

pub mod async_reader;
pub mod csv_format;

pub use async_reader::AsyncReader;
pub use csv_format::{group_orders, write_results_csv, CsvRecord};

//! Asynchronous CSV reader with batched order grouping
//!
//! Provides a streaming interface over orders from a CSV file of item rows.
//! Supports batch reading for efficient async processing while keeping
//! memory usage constant.
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming CSV parsing
//! - the csv_format module for row conversion and grouping rules
//! - a pending-group slot so an order whose item rows straddle a read batch
//!   is never split in two
//!
//! ```text
//! CSV rows → AsyncReader → Batches of Orders
//!                ↓
//!         csv_format module
//!         (CsvRecord, convert_csv_record)
//! ```

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::Order;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;

/// Asynchronous CSV order reader
///
/// Groups consecutive item rows into orders and yields them in batches.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,

    /// Order currently being assembled; completed when a row with a
    /// different id (or end of input) arrives
    pending: Option<Order>,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async reader
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            pending: None,
        }
    }

    /// Read a batch of up to `max_orders` complete orders
    ///
    /// Invalid rows are logged and skipped. Returns an empty vector once
    /// the end of the input is reached. An order under assembly at the
    /// batch boundary carries over to the next call intact.
    pub async fn read_batch(&mut self, max_orders: usize) -> Vec<Order> {
        let mut batch = Vec::with_capacity(max_orders);
        let mut records = self.csv_reader.deserialize::<CsvRecord>();

        while batch.len() < max_orders {
            match records.next().await {
                Some(Ok(record)) => {
                    let (id, item) = convert_csv_record(record);
                    let continues_pending =
                        matches!(&self.pending, Some(order) if order.id == id);

                    if continues_pending {
                        if let (Some(order), Some(item)) = (self.pending.as_mut(), item) {
                            order.items.push(item);
                        }
                    } else {
                        if let Some(finished) = self.pending.take() {
                            batch.push(finished);
                        }
                        self.pending = Some(Order::new(id, item.into_iter().collect()));
                    }
                }
                Some(Err(e)) => tracing::warn!("CSV parse error: {}", e),
                None => {
                    if let Some(finished) = self.pending.take() {
                        batch.push(finished);
                    }
                    break;
                }
            }
        }

        batch
    }
}

//! CSV format handling for order input and result output
//!
//! This module centralizes all CSV format concerns:
//! - `CsvRecord` - the input row structure (one row per item)
//! - conversion from rows to domain orders
//! - result output serialization
//!
//! All functions are pure (no I/O) for easy testing.
//!
//! # Input format
//!
//! Columns: `order,item,price`. Consecutive rows sharing an order id form
//! one order; a row with an empty item column declares an order with no
//! items. A price that is empty or unparseable yields an item without a
//! price - classification of that situation (cache fallback or item error)
//! belongs to the engine, not the parser.
//!
//! Rows sharing an order id that are *not* consecutive produce separate
//! order entries; the engine's dedup collapses them to one result.

use crate::types::{Item, Order, OrderId, ProcessingResult};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns: order, item, price.
/// Item and price are optional so itemless orders and unpriced items stay
/// representable.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    pub order: OrderId,
    pub item: Option<String>,
    pub price: Option<String>,
}

/// Convert a CsvRecord into its order id and optional item
///
/// An empty item column yields no item. An empty or unparseable price
/// yields an unpriced item (logged, not rejected - the price cache may
/// still resolve it).
pub fn convert_csv_record(record: CsvRecord) -> (OrderId, Option<Item>) {
    let item = record
        .item
        .filter(|id| !id.trim().is_empty())
        .map(|id| {
            let price = record.price.as_deref().and_then(|raw| {
                let raw = raw.trim();
                if raw.is_empty() {
                    return None;
                }
                match Decimal::from_str(raw) {
                    Ok(price) => Some(price),
                    Err(_) => {
                        tracing::warn!(
                            order = record.order,
                            item = %id,
                            price = %raw,
                            "unparseable price, treating item as unpriced"
                        );
                        None
                    }
                }
            });
            Item {
                id: id.trim().to_string(),
                price,
            }
        });

    (record.order, item)
}

/// Group CSV records into orders
///
/// Consecutive records with the same order id are folded into one order,
/// preserving item order.
pub fn group_orders(records: impl IntoIterator<Item = CsvRecord>) -> Vec<Order> {
    let mut orders: Vec<Order> = Vec::new();

    for record in records {
        let (id, item) = convert_csv_record(record);
        match orders.last_mut() {
            Some(order) if order.id == id => {
                if let Some(item) = item {
                    order.items.push(item);
                }
            }
            _ => orders.push(Order::new(id, item.into_iter().collect())),
        }
    }

    orders
}

/// Write processing results to CSV format
///
/// Columns: order, status, total, error. Results are sorted by order id for
/// deterministic output; the engine itself guarantees no ordering.
pub fn write_results_csv(
    results: &[ProcessingResult],
    output: &mut dyn Write,
) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["order", "status", "total", "error"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted = results.to_vec();
    sorted.sort_by_key(|result| result.order_id);

    for result in sorted {
        let (status, total, error) = match &result.outcome {
            Ok(total) => ("success", total.to_string(), String::new()),
            Err(err) => ("failed", String::new(), err.to_string()),
        };
        writer
            .write_record(&[result.order_id.to_string(), status.to_string(), total, error])
            .map_err(|e| format!("Failed to write result record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(order: OrderId, item: Option<&str>, price: Option<&str>) -> CsvRecord {
        CsvRecord {
            order,
            item: item.map(str::to_string),
            price: price.map(str::to_string),
        }
    }

    #[test]
    fn test_convert_priced_row() {
        let (id, item) = convert_csv_record(record(1, Some("widget"), Some("10.50")));
        assert_eq!(id, 1);
        assert_eq!(item, Some(Item::priced("widget", Decimal::new(1050, 2))));
    }

    #[test]
    fn test_convert_itemless_row() {
        let (id, item) = convert_csv_record(record(2, None, None));
        assert_eq!(id, 2);
        assert_eq!(item, None);
    }

    #[test]
    fn test_convert_unparseable_price_keeps_item() {
        let (_, item) = convert_csv_record(record(3, Some("widget"), Some("abc")));
        assert_eq!(item, Some(Item::unpriced("widget")));
    }

    #[test]
    fn test_convert_negative_price_parses() {
        // Negative prices parse here; the validator rejects them later
        let (_, item) = convert_csv_record(record(4, Some("widget"), Some("-1.00")));
        assert_eq!(item, Some(Item::priced("widget", Decimal::new(-100, 2))));
    }

    #[test]
    fn test_group_consecutive_rows() {
        let orders = group_orders(vec![
            record(1, Some("a"), Some("10")),
            record(1, Some("b"), Some("5")),
            record(2, None, None),
        ]);

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, 1);
        assert_eq!(orders[0].items.len(), 2);
        assert_eq!(orders[1].id, 2);
        assert!(orders[1].items.is_empty());
    }

    #[test]
    fn test_group_non_consecutive_ids_stay_separate() {
        let orders = group_orders(vec![
            record(1, Some("a"), Some("10")),
            record(2, Some("b"), Some("5")),
            record(1, Some("c"), Some("3")),
        ]);

        // Dedup is the engine's concern; grouping only folds adjacent rows
        assert_eq!(orders.len(), 3);
        assert_eq!(orders[2].id, 1);
    }

    #[test]
    fn test_write_results_sorted_by_order_id() {
        use crate::types::ProcessingError;

        let results = vec![
            ProcessingResult::success(2, Decimal::ZERO),
            ProcessingResult::failure(3, ProcessingError::unpriced_item(3, "x")),
            ProcessingResult::success(1, Decimal::new(1500, 2)),
        ];

        let mut output = Vec::new();
        write_results_csv(&results, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "order,status,total,error");
        assert_eq!(lines[1], "1,success,15.00,");
        assert_eq!(lines[2], "2,success,0,");
        assert!(lines[3].starts_with("3,failed,,"));
        assert!(lines[3].contains("no price available"));
    }
}

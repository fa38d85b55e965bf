//! Order Batch Engine CLI
//!
//! Command-line interface for processing order batches from CSV files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- orders.csv > results.csv
//! cargo run -- --batch-size 250 --max-concurrent 8 orders.csv > results.csv
//! cargo run -- --max-retries 5 --backoff-ms 50 orders.csv > results.csv
//! ```
//!
//! The program reads item rows (`order,item,price`) from the input CSV
//! file, groups them into orders, processes them through the engine against
//! an in-memory transactional store, and writes one result row per order to
//! stdout.
//!
//! # Exit Codes
//!
//! - 0: Success (per-order failures are reported in the output, not the
//!   exit code)
//! - 1: Error (missing arguments, file not found, systemic failure, etc.)

use order_batch_engine::cli::{self, CliArgs};
use order_batch_engine::io::{write_results_csv, AsyncReader};
use order_batch_engine::store::InMemoryOrderStore;
use order_batch_engine::OrderEngine;
use std::process;
use std::sync::Arc;
use tokio_util::compat::TokioAsyncReadCompatExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("order_batch_engine=debug,info"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("order_batch_engine=info"))
    };

    // Log lines go to stderr; stdout carries the results CSV
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

async fn run(args: CliArgs) -> Result<(), String> {
    let config = args.to_engine_config();

    let file = tokio::fs::File::open(&args.input_file)
        .await
        .map_err(|e| format!("Failed to open {}: {}", args.input_file.display(), e))?;

    let mut reader = AsyncReader::new(file.compat());
    let mut orders = Vec::new();
    loop {
        let batch = reader.read_batch(config.batch_size).await;
        if batch.is_empty() {
            break;
        }
        orders.extend(batch);
    }
    tracing::info!(orders = orders.len(), "input read");

    let store = Arc::new(InMemoryOrderStore::new());
    let engine = OrderEngine::new(store, config);

    let results = engine
        .process(orders)
        .await
        .map_err(|e| format!("Processing failed: {}", e))?;

    let mut output = std::io::stdout();
    write_results_csv(&results, &mut output)
}

#[tokio::main]
async fn main() {
    let args = cli::parse_args();
    init_logging(args.verbose);

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

use crate::core::EngineConfig;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Process order batches with caching and retrying persistence
#[derive(Parser, Debug)]
#[command(name = "order-batch-engine")]
#[command(about = "Process order batches with caching and retrying persistence", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing order item rows
    #[arg(value_name = "INPUT", help = "Path to the input CSV file (order,item,price rows)")]
    pub input_file: PathBuf,

    /// Number of orders per batch
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Orders per batch (default: 100)"
    )]
    pub batch_size: Option<usize>,

    /// Maximum number of concurrent batches
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum number of batches processing concurrently (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    /// Save attempts per order before recording a persistence failure
    #[arg(
        long = "max-retries",
        value_name = "N",
        help = "Save attempts per order before recording a persistence failure (default: 3)"
    )]
    pub max_retries: Option<u32>,

    /// Base backoff between save attempts, in milliseconds
    #[arg(
        long = "backoff-ms",
        value_name = "MS",
        help = "Base backoff in milliseconds, doubled per attempt (default: 100)"
    )]
    pub backoff_ms: Option<u64>,

    /// LRU capacity of the result cache
    #[arg(
        long = "result-cache-capacity",
        value_name = "N",
        help = "LRU capacity of the result cache (default: 1000)"
    )]
    pub result_cache_capacity: Option<usize>,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose", help = "Enable debug logging")]
    pub verbose: bool,
}

impl CliArgs {
    /// Create an EngineConfig from CLI arguments
    ///
    /// Unset flags fall back to the engine defaults; zero values are
    /// replaced with defaults (with a logged warning) by the config itself.
    pub fn to_engine_config(&self) -> EngineConfig {
        let default = EngineConfig::default();

        EngineConfig {
            batch_size: self.batch_size.unwrap_or(default.batch_size),
            max_concurrent_batches: self
                .max_concurrent_batches
                .unwrap_or(default.max_concurrent_batches),
            max_retries: self.max_retries.unwrap_or(default.max_retries),
            backoff_base: self
                .backoff_ms
                .map(Duration::from_millis)
                .unwrap_or(default.backoff_base),
            result_cache_capacity: self
                .result_cache_capacity
                .unwrap_or(default.result_cache_capacity),
            ..default
        }
        .sanitized()
    }
}

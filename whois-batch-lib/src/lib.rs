//! # whois-batch library
//!
//! Bulk domain availability checking over WHOIS.
//!
//! Given a list of base names and a set of suffixes, the library checks
//! every combination through a bounded pool of workers that share one
//! global rate limiter. Each WHOIS outcome, including errors, is classified
//! into an availability verdict, and the results can be exported as CSV,
//! JSON or HTML.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use whois_batch_lib::{parse_suffixes, BatchChecker, BatchConfig, ResultRecord};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let checker = BatchChecker::system(BatchConfig::default());
//!     let names = vec!["example".to_string(), "rust-lang".to_string()];
//!     let suffixes = parse_suffixes("com, org");
//!
//!     let summary = checker
//!         .run(&names, &suffixes, |r: &ResultRecord| println!("{} {}", r.domain, r.available), &CancellationToken::new())
//!         .await?;
//!     println!("{} records", summary.records.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Global rate limiting**: one minimum interval across all workers
//! - **Free-leaning classification**: ambiguous WHOIS errors count as available
//! - **Streaming results**: each record reaches the sink as soon as it completes
//! - **Cancellation**: stop dispatching on demand, no partial records
//! - **Exporters**: CSV, pretty JSON and a styled HTML report

// Re-export main public API types and functions
pub use checker::BatchChecker;
pub use classifier::{classify, indicates_free, FREE_ERROR_PHRASES};
pub use collector::{NullSink, ResultCollector, ResultSink};
pub use concurrent::{check_item, Dispatcher};
pub use config::{
    load_env_config, validate_delay, ConfigManager, DefaultsConfig, EnvConfig,
    FileConfig, Settings, DEFAULT_INPUT_FILE,
};
pub use error::WhoisBatchError;
pub use export::{export_records, render_csv, render_html, render_json, ExportFormat, CSV_HEADER};
pub use protocols::{LookupError, LookupOutcome, SystemWhoisClient, WhoisLookup, WhoisRecord};
pub use rate_limit::RateLimiter;
pub use types::{BatchConfig, ResultRecord, RunSummary, Verdict, WorkItem};
pub use utils::{build_work_items, load_names, normalize_suffix, parse_names, parse_suffixes};

// Public modules
pub mod protocols;

// Internal modules - these are not part of the public API
mod checker;
mod classifier;
mod collector;
mod concurrent;
mod config;
mod error;
mod export;
mod rate_limit;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, WhoisBatchError>;

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Batch checker: the library's main entry point.
//!
//! `BatchChecker` ties the pieces together: it expands names × suffixes into
//! work items, builds the shared rate limiter, runs the worker pool and
//! returns the collected results.

use crate::collector::{ResultCollector, ResultSink};
use crate::concurrent::Dispatcher;
use crate::error::WhoisBatchError;
use crate::protocols::{SystemWhoisClient, WhoisLookup};
use crate::rate_limit::RateLimiter;
use crate::types::{BatchConfig, RunSummary};
use crate::utils::build_work_items;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Checks every name/suffix combination with a shared lookup backend.
///
/// # Example
///
/// ```rust,no_run
/// use whois_batch_lib::{BatchChecker, BatchConfig, NullSink};
/// use tokio_util::sync::CancellationToken;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let checker = BatchChecker::system(BatchConfig::default());
///     let names = vec!["example".to_string()];
///     let suffixes = vec![".com".to_string()];
///     let summary = checker
///         .run(&names, &suffixes, NullSink, &CancellationToken::new())
///         .await?;
///     println!("{} records", summary.records.len());
///     Ok(())
/// }
/// ```
pub struct BatchChecker<L: WhoisLookup> {
    config: BatchConfig,
    lookup: Arc<L>,
    limiter: Arc<RateLimiter>,
}

impl BatchChecker<SystemWhoisClient> {
    /// Create a checker that uses the system `whois` command.
    pub fn system(config: BatchConfig) -> Self {
        Self::new(SystemWhoisClient::new(), config)
    }
}

impl<L: WhoisLookup> BatchChecker<L> {
    pub fn new(lookup: L, config: BatchConfig) -> Self {
        let limiter = Arc::new(RateLimiter::new(config.delay));
        Self {
            config,
            lookup: Arc::new(lookup),
            limiter,
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Check all combinations of `names` × `suffixes`.
    ///
    /// Suffixes must already be normalized (see
    /// [`parse_suffixes`](crate::parse_suffixes)). Each retained record is
    /// handed to `sink` as soon as it is collected.
    ///
    /// # Errors
    ///
    /// - `ConfigError` if either list is empty
    /// - `Cancelled` if `cancel` fires before the run completes
    pub async fn run<S: ResultSink>(
        &self,
        names: &[String],
        suffixes: &[String],
        sink: S,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, WhoisBatchError> {
        if names.is_empty() {
            return Err(WhoisBatchError::config("No names to check"));
        }
        if suffixes.is_empty() {
            return Err(WhoisBatchError::config("No valid suffixes given"));
        }

        let items = build_work_items(names, suffixes);
        let total = items.len();
        info!(
            total,
            names = names.len(),
            suffixes = suffixes.len(),
            delay_ms = self.config.delay.as_millis() as u64,
            "starting batch check"
        );

        let start = Instant::now();
        let dispatcher = Dispatcher::new(
            Arc::clone(&self.lookup),
            Arc::clone(&self.limiter),
            self.config.threads,
        );
        let mut collector = ResultCollector::new(self.config.only_free, sink);
        let processed = dispatcher.run(items, &mut collector, cancel).await?;
        let duration = start.elapsed();

        let records = collector.into_records();
        info!(
            processed,
            retained = records.len(),
            elapsed_ms = duration.as_millis() as u64,
            "batch check finished"
        );

        Ok(RunSummary {
            records,
            total,
            processed,
            duration,
        })
    }
}

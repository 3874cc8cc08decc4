//! Core data types for batch availability checking.
//!
//! Work items flow through the pool as [`WorkItem`], come back from the
//! classifier as a [`Verdict`], and are stored as [`ResultRecord`].

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One name/suffix combination to check.
///
/// The suffix is expected to be normalized already (lower-case, leading dot),
/// see [`normalize_suffix`](crate::normalize_suffix).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkItem {
    pub name: String,
    pub suffix: String,
}

impl WorkItem {
    pub fn new<N: Into<String>, S: Into<String>>(name: N, suffix: S) -> Self {
        Self {
            name: name.into(),
            suffix: suffix.into(),
        }
    }

    /// The domain string to look up: `name + suffix`.
    pub fn domain(&self) -> String {
        format!("{}{}", self.name, self.suffix)
    }
}

/// Availability verdict for a single domain.
///
/// `info` is a human-readable explanation. It is only ever displayed or
/// exported, never inspected by program logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub available: bool,
    pub info: String,
}

impl Verdict {
    pub fn available<I: Into<String>>(info: I) -> Self {
        Self {
            available: true,
            info: info.into(),
        }
    }

    pub fn taken<I: Into<String>>(info: I) -> Self {
        Self {
            available: false,
            info: info.into(),
        }
    }
}

/// Result of checking one work item.
///
/// Field order matches the CSV/JSON export column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub name: String,
    pub suffix: String,
    pub domain: String,
    pub available: bool,
    pub info: String,
}

impl ResultRecord {
    /// Combine a work item with its verdict.
    pub fn new(item: WorkItem, verdict: Verdict) -> Self {
        let domain = item.domain();
        Self {
            name: item.name,
            suffix: item.suffix,
            domain,
            available: verdict.available,
            info: verdict.info,
        }
    }
}

/// Configuration for a batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    /// Maximum number of concurrent workers.
    /// Default: 10, Range: 1-100
    pub threads: usize,

    /// Minimum spacing between the starts of any two WHOIS calls.
    /// Default: 500ms. Zero disables rate limiting.
    pub delay: Duration,

    /// Drop taken domains from console output and exports.
    /// Default: false
    pub only_free: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            threads: 10,
            delay: Duration::from_millis(500),
            only_free: false,
        }
    }
}

impl BatchConfig {
    /// Set the worker count. Capped to 1-100 to prevent resource exhaustion.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.clamp(1, 100);
        self
    }

    /// Set the delay from a number of seconds.
    ///
    /// Negative, NaN or infinite values disable rate limiting. Values too
    /// large for a `Duration` saturate to `Duration::MAX`.
    pub fn with_delay_secs(mut self, secs: f64) -> Self {
        self.delay = duration_from_secs(secs);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_only_free(mut self, only_free: bool) -> Self {
        self.only_free = only_free;
        self
    }
}

/// Outcome of a completed (not cancelled) batch run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Retained records in completion order
    pub records: Vec<ResultRecord>,

    /// Number of work items that were dispatched
    pub total: usize,

    /// Number of records produced by workers, before filtering
    pub processed: usize,

    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl RunSummary {
    pub fn available_count(&self) -> usize {
        self.records.iter().filter(|r| r.available).count()
    }

    pub fn taken_count(&self) -> usize {
        self.records.len() - self.available_count()
    }
}

pub(crate) fn duration_from_secs(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

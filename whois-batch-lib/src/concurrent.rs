//! Worker pool for concurrent WHOIS checks.
//!
//! A fixed number of workers pull [`WorkItem`]s from a shared queue. Each
//! worker waits on the shared [`RateLimiter`], runs the blocking lookup on
//! tokio's blocking thread pool, classifies the outcome and sends the
//! [`ResultRecord`] down a channel. A single consumer drains the channel
//! into the [`ResultCollector`].
//!
//! ```text
//! queue ──► worker 0 ─┐
//!       ──► worker 1 ─┼─► mpsc ──► ResultCollector ──► ResultSink
//!       ──► worker N ─┘
//! ```

use crate::classifier::{classify, worker_fault};
use crate::collector::{ResultCollector, ResultSink};
use crate::error::WhoisBatchError;
use crate::protocols::WhoisLookup;
use crate::rate_limit::RateLimiter;
use crate::types::{ResultRecord, WorkItem};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

type WorkQueue = Arc<Mutex<VecDeque<WorkItem>>>;

/// Runs work items across a bounded pool of workers.
pub struct Dispatcher<L: WhoisLookup> {
    lookup: Arc<L>,
    limiter: Arc<RateLimiter>,
    threads: usize,
}

impl<L: WhoisLookup> Dispatcher<L> {
    /// Create a dispatcher with a shared lookup and rate limiter.
    ///
    /// `threads` is the configured worker count; the actual pool size is
    /// also capped by the number of items (see [`worker_count`](Self::worker_count)).
    pub fn new(lookup: Arc<L>, limiter: Arc<RateLimiter>, threads: usize) -> Self {
        Self {
            lookup,
            limiter,
            threads,
        }
    }

    /// Pool size for a run of `total` items: `min(threads, total)`, at least 1.
    pub fn worker_count(&self, total: usize) -> usize {
        self.threads.min(total).max(1)
    }

    /// Process every item, feeding results into `collector` as they complete.
    ///
    /// Returns the number of records produced (before filtering).
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` as soon as `cancel` fires. No new items are
    /// dispatched after that, and results still in flight are discarded.
    pub async fn run<S: ResultSink>(
        &self,
        items: Vec<WorkItem>,
        collector: &mut ResultCollector<S>,
        cancel: &CancellationToken,
    ) -> Result<usize, WhoisBatchError> {
        let total = items.len();
        let workers = self.worker_count(total);
        debug!(total, workers, "starting worker pool");

        let queue: WorkQueue = Arc::new(Mutex::new(VecDeque::from(items)));
        let (tx, mut rx) = mpsc::channel::<ResultRecord>(workers);

        let mut pool = JoinSet::new();
        for worker_id in 0..workers {
            pool.spawn(worker_loop(
                worker_id,
                Arc::clone(&queue),
                Arc::clone(&self.lookup),
                Arc::clone(&self.limiter),
                tx.clone(),
                cancel.clone(),
            ));
        }
        // Channel closes once every worker has dropped its sender
        drop(tx);

        let mut completed = 0;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    pool.abort_all();
                    warn!(completed, total, "run cancelled, abandoning in-flight checks");
                    return Err(WhoisBatchError::cancelled(completed, total));
                }
                received = rx.recv() => match received {
                    Some(record) => {
                        completed += 1;
                        collector.accept(record);
                    }
                    None => break,
                },
            }
        }

        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                warn!("worker task failed: {}", e);
            }
        }

        if completed < total {
            return Err(WhoisBatchError::internal(format!(
                "worker pool finished with {} of {} results",
                completed, total
            )));
        }

        Ok(completed)
    }
}

async fn worker_loop<L: WhoisLookup>(
    worker_id: usize,
    queue: WorkQueue,
    lookup: Arc<L>,
    limiter: Arc<RateLimiter>,
    tx: mpsc::Sender<ResultRecord>,
    cancel: CancellationToken,
) {
    loop {
        if cancel.is_cancelled() {
            break;
        }

        let Some(item) = next_item(&queue) else {
            break;
        };

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = limiter.wait() => {}
        }

        debug!(worker_id, domain = %item.domain(), "dispatching lookup");
        let record = check_item(Arc::clone(&lookup), item).await;

        if tx.send(record).await.is_err() {
            // Receiver gone: the run was abandoned
            break;
        }
    }
}

fn next_item(queue: &WorkQueue) -> Option<WorkItem> {
    match queue.lock() {
        Ok(mut guard) => guard.pop_front(),
        Err(poisoned) => poisoned.into_inner().pop_front(),
    }
}

/// Look up and classify a single item, without rate limiting.
///
/// The lookup runs on the blocking thread pool. If it panics, the item still
/// gets a record (available, with a "worker fault" explanation).
pub async fn check_item<L: WhoisLookup>(lookup: Arc<L>, item: WorkItem) -> ResultRecord {
    let domain = item.domain();

    let verdict = match tokio::task::spawn_blocking(move || lookup.lookup(&domain)).await {
        Ok(outcome) => classify(&outcome),
        Err(e) => {
            warn!(domain = %item.domain(), "lookup did not complete: {}", e);
            worker_fault(&e.to_string())
        }
    };

    debug!(domain = %item.domain(), available = verdict.available, info = %verdict.info, "classified");
    ResultRecord::new(item, verdict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::NullSink;
    use crate::protocols::{LookupError, LookupOutcome, WhoisRecord};
    use crate::utils::build_work_items;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn dispatcher<L: WhoisLookup>(lookup: L, threads: usize) -> Dispatcher<L> {
        Dispatcher::new(Arc::new(lookup), Arc::new(RateLimiter::new(Duration::ZERO)), threads)
    }

    fn taken_if_starts_with_t(domain: &str) -> LookupOutcome {
        if domain.starts_with('t') {
            Ok(WhoisRecord::registered(domain.to_uppercase()))
        } else {
            Err(LookupError::new(format!("No match for {}", domain)))
        }
    }

    #[test]
    fn test_worker_count_bounds() {
        let d = dispatcher(taken_if_starts_with_t, 10);
        assert_eq!(d.worker_count(3), 3);
        assert_eq!(d.worker_count(50), 10);
        assert_eq!(d.worker_count(0), 1);

        let d = dispatcher(taken_if_starts_with_t, 0);
        assert_eq!(d.worker_count(5), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_one_record_per_item() {
        let items = build_work_items(
            &names(&["alpha", "tango", "bravo", "tiger", "delta"]),
            &names(&[".cz", ".com", ".net"]),
        );
        let expected: HashSet<String> = items.iter().map(WorkItem::domain).collect();

        let d = dispatcher(taken_if_starts_with_t, 4);
        let mut collector = ResultCollector::new(false, NullSink);
        let processed = d
            .run(items, &mut collector, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(processed, 15);
        let records = collector.into_records();
        assert_eq!(records.len(), 15);

        let got: HashSet<String> = records.iter().map(|r| r.domain.clone()).collect();
        assert_eq!(got, expected);

        for record in &records {
            assert_eq!(record.available, !record.name.starts_with('t'));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_panicking_lookup_becomes_available_verdict() {
        let lookup = |domain: &str| -> LookupOutcome {
            if domain == "boom.test" {
                panic!("resolver exploded");
            }
            Ok(WhoisRecord::registered(domain))
        };

        let items = build_work_items(&names(&["boom", "fine"]), &names(&[".test"]));
        let d = dispatcher(lookup, 2);
        let mut collector = ResultCollector::new(false, NullSink);
        d.run(items, &mut collector, &CancellationToken::new())
            .await
            .unwrap();

        let records = collector.into_records();
        assert_eq!(records.len(), 2);

        let boom = records.iter().find(|r| r.domain == "boom.test").unwrap();
        assert!(boom.available);
        assert!(boom.info.starts_with("worker fault (treated as available)"));

        let fine = records.iter().find(|r| r.domain == "fine.test").unwrap();
        assert!(!fine.available);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancel_before_start_dispatches_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let lookup = move |_: &str| -> LookupOutcome {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(WhoisRecord::empty())
        };

        let cancel = CancellationToken::new();
        cancel.cancel();

        let items = build_work_items(&names(&["a", "b", "c"]), &names(&[".test"]));
        let d = dispatcher(lookup, 3);
        let mut collector = ResultCollector::new(false, NullSink);
        let err = d.run(items, &mut collector, &cancel).await.unwrap_err();

        assert!(err.is_cancelled());
        assert!(collector.records().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancel_mid_run_stops_dispatching() {
        let items = build_work_items(
            &names(&["a", "b", "c", "d", "e", "f", "g", "h"]),
            &names(&[".test"]),
        );
        let d = Dispatcher::new(
            Arc::new(|_: &str| -> LookupOutcome { Ok(WhoisRecord::empty()) }),
            Arc::new(RateLimiter::new(Duration::from_millis(100))),
            2,
        );

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let mut seen = 0usize;
        let mut collector = ResultCollector::new(false, |_: &ResultRecord| {
            seen += 1;
            if seen == 2 {
                trigger.cancel();
            }
        });

        let err = d.run(items, &mut collector, &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        let retained = collector.records().len();
        assert!(retained >= 2 && retained < 8);
    }

    #[tokio::test]
    async fn test_check_item_builds_record() {
        let record = check_item(
            Arc::new(taken_if_starts_with_t),
            WorkItem::new("bar", ".test"),
        )
        .await;

        assert_eq!(record.domain, "bar.test");
        assert!(record.available);
        assert!(record.info.starts_with("exception indicated free"));
    }
}

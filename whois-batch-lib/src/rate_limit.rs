//! Process-wide spacing of WHOIS calls.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum interval between the starts of any two permitted
/// calls, across every worker sharing this limiter.
///
/// The lock is held for the whole check, sleep and update sequence, so two
/// workers can never both observe a stale timestamp and proceed early. The
/// stored timestamp is taken after the sleep. Waiting workers are not served
/// in FIFO order.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Build a limiter from seconds. Non-positive values disable limiting.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self::new(crate::types::duration_from_secs(secs))
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until this caller may start its call.
    ///
    /// Returns immediately when the interval is zero, and for the very
    /// first call.
    pub async fn wait(&self) {
        let _ = self.acquire().await;
    }

    /// Like [`wait`](Self::wait), returning the instant recorded as this
    /// call's start. `None` when limiting is disabled.
    pub(crate) async fn acquire(&self) -> Option<Instant> {
        if self.min_interval.is_zero() {
            return None;
        }

        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }

        let now = Instant::now();
        *last_call = Some(now);
        Some(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_zero_interval_is_noop() {
        let limiter = RateLimiter::from_secs_f64(0.0);
        let start = Instant::now();
        for _ in 0..100 {
            limiter.wait().await;
        }
        assert!(start.elapsed() < Duration::from_millis(100));
        assert!(limiter.acquire().await.is_none());
    }

    #[tokio::test]
    async fn test_negative_interval_is_noop() {
        let limiter = RateLimiter::from_secs_f64(-3.0);
        assert_eq!(limiter.min_interval(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_first_call_does_not_wait() {
        let limiter = RateLimiter::new(Duration::from_secs(5));
        let start = Instant::now();
        limiter.wait().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_are_spaced() {
        let interval = Duration::from_millis(200);
        let limiter = Arc::new(RateLimiter::new(interval));
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..5 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move { limiter.acquire().await }));
        }

        let mut starts = Vec::new();
        for handle in handles {
            starts.push(handle.await.unwrap().unwrap());
        }

        assert!(start.elapsed() >= interval * 4);

        starts.sort();
        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= interval);
        }
    }
}

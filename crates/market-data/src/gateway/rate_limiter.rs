//! Sliding-window rate limiter keyed per upstream exchange.
//!
//! Admission is decided by counting requests in the trailing window ending
//! at the current instant, not within fixed calendar buckets, so a rejected
//! caller becomes eligible exactly when their oldest still-counted request
//! ages out. Each key gets its own fully independent window, created lazily
//! on first use.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::Serialize;

use crate::errors::GatewayError;

/// Point-in-time view of one key's window, for management endpoints.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct RateLimitStatus {
    /// Configured admissions per window.
    pub limit: usize,
    /// Admissions left right now.
    pub remaining: usize,
    /// Window duration.
    pub window: Duration,
}

/// Sliding-window rate limiter for multiple independent keys.
///
/// Thread-safe; `allow` is atomic per key, so concurrent callers cannot
/// both observe a stale count and overshoot the quota.
pub struct SlidingWindowLimiter {
    /// Per-key admission timestamps, oldest first.
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl SlidingWindowLimiter {
    /// Create a limiter admitting `max_requests` per `window` per key.
    ///
    /// Fails with [`GatewayError::Configuration`] on zero values.
    pub fn new(max_requests: usize, window: Duration) -> Result<Self, GatewayError> {
        if max_requests == 0 {
            return Err(GatewayError::configuration(
                "rate limit max_requests must be positive",
            ));
        }
        if window.is_zero() {
            return Err(GatewayError::configuration(
                "rate limit window must be positive",
            ));
        }

        info!(
            "Rate limiter initialized: {} requests per {:?}",
            max_requests, window
        );

        Ok(Self {
            windows: Mutex::new(HashMap::new()),
            max_requests,
            window,
        })
    }

    /// Lock the windows mutex, recovering from poison if necessary.
    ///
    /// For rate limiting it's safe to recover from a poisoned mutex since
    /// the worst case is slightly incorrect admission, which is better
    /// than panicking.
    fn lock_windows(&self) -> MutexGuard<'_, HashMap<String, VecDeque<Instant>>> {
        self.windows.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter windows mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Drop timestamps that have aged out of the trailing window.
    fn prune(timestamps: &mut VecDeque<Instant>, cutoff: Option<Instant>) {
        if let Some(cutoff) = cutoff {
            while timestamps.front().is_some_and(|t| *t <= cutoff) {
                timestamps.pop_front();
            }
        }
    }

    /// Check admission for `key` and record the request if admitted.
    ///
    /// Returns `true` and records the current instant when the pruned
    /// window holds fewer than `max_requests` entries; returns `false`
    /// without recording anything otherwise.
    pub fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.lock_windows();
        let timestamps = windows.entry(key.to_string()).or_default();

        Self::prune(timestamps, now.checked_sub(self.window));

        if timestamps.len() < self.max_requests {
            timestamps.push_back(now);
            debug!(
                "Rate limiter: admitted '{}' ({}/{})",
                key,
                timestamps.len(),
                self.max_requests
            );
            true
        } else {
            warn!("Rate limit exceeded for '{}'", key);
            false
        }
    }

    /// Admissions left for `key` right now.
    pub fn remaining(&self, key: &str) -> usize {
        let now = Instant::now();
        let mut windows = self.lock_windows();

        match windows.get_mut(key) {
            Some(timestamps) => {
                Self::prune(timestamps, now.checked_sub(self.window));
                self.max_requests.saturating_sub(timestamps.len())
            }
            None => self.max_requests,
        }
    }

    /// Estimated wait until the next admission for `key` is possible.
    /// Zero while the key is under quota.
    pub fn retry_after(&self, key: &str) -> Duration {
        let now = Instant::now();
        let mut windows = self.lock_windows();

        match windows.get_mut(key) {
            Some(timestamps) => {
                Self::prune(timestamps, now.checked_sub(self.window));
                if timestamps.len() < self.max_requests {
                    Duration::ZERO
                } else {
                    // Eligible again once the oldest entry ages out.
                    match timestamps.front() {
                        Some(oldest) => (*oldest + self.window).saturating_duration_since(now),
                        None => Duration::ZERO,
                    }
                }
            }
            None => Duration::ZERO,
        }
    }

    /// Point-in-time status for `key`.
    pub fn status(&self, key: &str) -> RateLimitStatus {
        RateLimitStatus {
            limit: self.max_requests,
            remaining: self.remaining(key),
            window: self.window,
        }
    }

    /// Clear recorded requests for one key only.
    pub fn reset(&self, key: &str) {
        let mut windows = self.lock_windows();
        if windows.remove(key).is_some() {
            info!("Rate limit reset for '{}'", key);
        }
    }

    /// Clear recorded requests for every key.
    pub fn reset_all(&self) {
        let mut windows = self.lock_windows();
        windows.clear();
        info!("All rate limits reset");
    }

    /// Wait (asynchronously) until `key` is admitted.
    ///
    /// Convenience for callers that prefer backpressure over a
    /// [`RateLimitExceeded`](GatewayError::RateLimitExceeded) error; the
    /// gateway itself never waits.
    pub async fn acquire(&self, key: &str) {
        loop {
            if self.allow(key) {
                return;
            }

            let wait = self.retry_after(key).max(Duration::from_millis(1));
            debug!("Rate limiter: waiting {:?} for '{}'", wait, key);
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: usize, window_secs: u64) -> SlidingWindowLimiter {
        SlidingWindowLimiter::new(max_requests, Duration::from_secs(window_secs)).unwrap()
    }

    /// Backdate the oldest recorded request for `key` by `age`.
    fn backdate_oldest(limiter: &SlidingWindowLimiter, key: &str, age: Duration) {
        let mut windows = limiter.windows.lock().unwrap();
        let timestamps = windows.get_mut(key).unwrap();
        let front = timestamps.front_mut().unwrap();
        *front = Instant::now() - age;
    }

    #[test]
    fn test_rejects_zero_max_requests() {
        let result = SlidingWindowLimiter::new(0, Duration::from_secs(60));
        assert!(matches!(result, Err(GatewayError::Configuration { .. })));
    }

    #[test]
    fn test_rejects_zero_window() {
        let result = SlidingWindowLimiter::new(10, Duration::ZERO);
        assert!(matches!(result, Err(GatewayError::Configuration { .. })));
    }

    #[test]
    fn test_admits_up_to_quota_then_rejects() {
        let limiter = limiter(3, 60);

        assert!(limiter.allow("binance"));
        assert!(limiter.allow("binance"));
        assert!(limiter.allow("binance"));
        assert!(!limiter.allow("binance"));
    }

    #[test]
    fn test_rejected_call_records_nothing() {
        let limiter = limiter(2, 60);
        limiter.allow("kraken");
        limiter.allow("kraken");

        // Several rejected calls must not extend the window.
        assert!(!limiter.allow("kraken"));
        assert!(!limiter.allow("kraken"));

        // Age out only the first admission: exactly one slot frees up,
        // which would not hold if rejections had been recorded.
        backdate_oldest(&limiter, "kraken", Duration::from_secs(61));
        assert_eq!(limiter.remaining("kraken"), 1);
        assert!(limiter.allow("kraken"));
        assert!(!limiter.allow("kraken"));
    }

    #[test]
    fn test_window_slides_per_entry() {
        let limiter = limiter(3, 60);
        limiter.allow("binance");
        limiter.allow("binance");
        limiter.allow("binance");
        assert!(!limiter.allow("binance"));

        // First admission ages past the window while the other two remain.
        backdate_oldest(&limiter, "binance", Duration::from_secs(61));

        assert!(limiter.allow("binance"));
        assert!(!limiter.allow("binance"));
    }

    #[test]
    fn test_remaining_counts_down() {
        let limiter = limiter(3, 60);
        assert_eq!(limiter.remaining("okx"), 3);

        limiter.allow("okx");
        assert_eq!(limiter.remaining("okx"), 2);

        limiter.allow("okx");
        assert_eq!(limiter.remaining("okx"), 1);
    }

    #[test]
    fn test_keys_never_share_quota() {
        let limiter = limiter(2, 60);
        limiter.allow("binance");
        limiter.allow("binance");
        assert!(!limiter.allow("binance"));

        assert_eq!(limiter.remaining("coinbase"), 2);
        assert!(limiter.allow("coinbase"));
    }

    #[test]
    fn test_reset_clears_only_that_key() {
        let limiter = limiter(2, 60);
        limiter.allow("binance");
        limiter.allow("binance");
        limiter.allow("kraken");

        limiter.reset("binance");

        assert_eq!(limiter.remaining("binance"), 2);
        assert_eq!(limiter.remaining("kraken"), 1);
    }

    #[test]
    fn test_reset_all() {
        let limiter = limiter(1, 60);
        limiter.allow("binance");
        limiter.allow("kraken");

        limiter.reset_all();

        assert_eq!(limiter.remaining("binance"), 1);
        assert_eq!(limiter.remaining("kraken"), 1);
    }

    #[test]
    fn test_retry_after_zero_under_quota() {
        let limiter = limiter(2, 60);
        limiter.allow("binance");
        assert_eq!(limiter.retry_after("binance"), Duration::ZERO);
        assert_eq!(limiter.retry_after("unseen"), Duration::ZERO);
    }

    #[test]
    fn test_retry_after_tracks_oldest_entry() {
        let limiter = limiter(1, 60);
        limiter.allow("binance");
        assert!(!limiter.allow("binance"));

        let wait = limiter.retry_after("binance");
        assert!(wait > Duration::from_secs(59));
        assert!(wait <= Duration::from_secs(60));

        // Half the window already elapsed for the oldest entry.
        backdate_oldest(&limiter, "binance", Duration::from_secs(30));
        let wait = limiter.retry_after("binance");
        assert!(wait <= Duration::from_secs(30));
        assert!(wait > Duration::from_secs(29));
    }

    #[test]
    fn test_status_snapshot() {
        let limiter = limiter(3, 60);
        limiter.allow("gate");

        let status = limiter.status("gate");
        assert_eq!(status.limit, 3);
        assert_eq!(status.remaining, 2);
        assert_eq!(status.window, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_acquire_waits_for_a_slot() {
        let limiter =
            SlidingWindowLimiter::new(1, Duration::from_millis(20)).unwrap();

        limiter.acquire("binance").await;

        // Second acquire must wait for the first admission to age out.
        let start = Instant::now();
        limiter.acquire("binance").await;
        assert!(start.elapsed() >= Duration::from_millis(10));
    }
}

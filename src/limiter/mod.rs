//! Per-caller sliding-window rate limiter.
//!
//! Each caller id owns a window of admission timestamps. A request is
//! admitted when fewer than `max_requests` timestamps fall inside the
//! trailing window; rejected requests are not recorded and do not extend the
//! caller's penalty.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use log::warn;

/// Sliding-window limiter keyed by caller id.
pub struct SlidingWindowLimiter {
    windows: Mutex<HashMap<String, Vec<Instant>>>,
    max_requests: u32,
    window: Duration,
}

impl SlidingWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_requests,
            window,
        }
    }

    /// Admission key used for bulk operations, distinct from the caller's
    /// single-request key so one bulk call cannot starve single lookups.
    pub fn bulk_key(caller_id: &str) -> String {
        format!("{}:bulk", caller_id)
    }

    /// Checks and records an admission for `caller_id`.
    pub fn is_allowed(&self, caller_id: &str) -> bool {
        self.check_at(caller_id, Instant::now())
    }

    fn check_at(&self, caller_id: &str, now: Instant) -> bool {
        let mut windows = self.lock_windows();
        let timestamps = windows.entry(caller_id.to_string()).or_default();
        Self::prune(timestamps, now, self.window);

        if timestamps.len() >= self.max_requests as usize {
            warn!(
                "Rate limit exceeded for caller '{}' ({} requests in window)",
                caller_id,
                timestamps.len()
            );
            return false;
        }
        timestamps.push(now);
        true
    }

    /// Requests left in the caller's current window.
    pub fn remaining(&self, caller_id: &str) -> u32 {
        self.remaining_at(caller_id, Instant::now())
    }

    fn remaining_at(&self, caller_id: &str, now: Instant) -> u32 {
        let mut windows = self.lock_windows();
        match windows.get_mut(caller_id) {
            Some(timestamps) => {
                Self::prune(timestamps, now, self.window);
                self.max_requests.saturating_sub(timestamps.len() as u32)
            }
            None => self.max_requests,
        }
    }

    /// Time until the oldest in-window admission ages out. Zero when the
    /// caller has no recorded admissions.
    pub fn retry_after(&self, caller_id: &str) -> Duration {
        self.retry_after_at(caller_id, Instant::now())
    }

    fn retry_after_at(&self, caller_id: &str, now: Instant) -> Duration {
        let mut windows = self.lock_windows();
        match windows.get_mut(caller_id) {
            Some(timestamps) => {
                Self::prune(timestamps, now, self.window);
                timestamps
                    .first()
                    .map(|oldest| (*oldest + self.window).saturating_duration_since(now))
                    .unwrap_or(Duration::ZERO)
            }
            None => Duration::ZERO,
        }
    }

    /// Drops the caller's window. Returns whether one existed.
    pub fn reset(&self, caller_id: &str) -> bool {
        self.lock_windows().remove(caller_id).is_some()
    }

    fn prune(timestamps: &mut Vec<Instant>, now: Instant, window: Duration) {
        timestamps.retain(|t| now.saturating_duration_since(*t) < window);
    }

    fn lock_windows(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<Instant>>> {
        self.windows.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter mutex poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_up_to_limit_then_rejects() {
        let limiter = SlidingWindowLimiter::new(3, Duration::from_secs(60));
        let start = Instant::now();

        assert!(limiter.check_at("c1", start));
        assert!(limiter.check_at("c1", start + Duration::from_secs(1)));
        assert!(limiter.check_at("c1", start + Duration::from_secs(2)));
        assert!(!limiter.check_at("c1", start + Duration::from_secs(3)));
    }

    #[test]
    fn test_admits_again_after_window_slides() {
        let limiter = SlidingWindowLimiter::new(3, Duration::from_secs(60));
        let start = Instant::now();
        for i in 0..3 {
            assert!(limiter.check_at("c1", start + Duration::from_secs(i)));
        }
        assert!(!limiter.check_at("c1", start + Duration::from_secs(3)));
        // 61 s after the first admission the oldest timestamp has aged out.
        assert!(limiter.check_at("c1", start + Duration::from_secs(61)));
    }

    #[test]
    fn test_rejected_attempts_not_recorded() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.check_at("c1", start));
        assert!(limiter.check_at("c1", start));
        // Hammering while rejected must not extend the penalty.
        for i in 0..10 {
            assert!(!limiter.check_at("c1", start + Duration::from_secs(i)));
        }
        assert!(limiter.check_at("c1", start + Duration::from_secs(60)));
    }

    #[test]
    fn test_callers_are_independent() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.check_at("c1", start));
        assert!(!limiter.check_at("c1", start));
        assert!(limiter.check_at("c2", start));
    }

    #[test]
    fn test_remaining_counts_down() {
        let limiter = SlidingWindowLimiter::new(3, Duration::from_secs(60));
        let start = Instant::now();

        assert_eq!(limiter.remaining_at("c1", start), 3);
        limiter.check_at("c1", start);
        limiter.check_at("c1", start);
        assert_eq!(limiter.remaining_at("c1", start), 1);
        assert_eq!(limiter.remaining_at("c1", start + Duration::from_secs(61)), 3);
    }

    #[test]
    fn test_retry_after_tracks_oldest_timestamp() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();

        assert_eq!(limiter.retry_after_at("c1", start), Duration::ZERO);
        limiter.check_at("c1", start);
        assert_eq!(
            limiter.retry_after_at("c1", start + Duration::from_secs(10)),
            Duration::from_secs(50)
        );
    }

    #[test]
    fn test_reset_clears_window() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();
        limiter.check_at("c1", start);
        assert!(!limiter.check_at("c1", start));

        assert!(limiter.reset("c1"));
        assert!(!limiter.reset("c1"));
        assert!(limiter.check_at("c1", start));
    }

    #[test]
    fn test_bulk_key_shape() {
        assert_eq!(SlidingWindowLimiter::bulk_key("client-7"), "client-7:bulk");
    }
}

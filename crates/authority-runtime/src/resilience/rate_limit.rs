//! In-memory sliding-window rate limiter.
//!
//! Prevents API quota abuse without external dependencies. Keyed by a
//! caller identifier supplied by the embedding application.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default maximum requests per window.
pub const DEFAULT_MAX_REQUESTS: usize = 10;

/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Sliding-window rate limiter. Thread-safe for concurrent requests.
///
/// ```ignore
/// let limiter = RateLimiter::new(10, Duration::from_secs(60));
/// if let Err(retry_after) = limiter.check("192.168.1.1") {
///     eprintln!("rate limited, retry in {:?}", retry_after);
/// }
/// ```
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    requests: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    /// Create a limiter allowing `max_requests` per `window`.
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            requests: Mutex::new(HashMap::new()),
        }
    }

    /// Check whether a request is allowed for the given identifier.
    ///
    /// On success the request is recorded. On rejection, returns how long
    /// the caller should wait before the oldest recorded request leaves
    /// the window.
    pub fn check(&self, identifier: &str) -> Result<(), Duration> {
        let now = Instant::now();
        let mut requests = self.requests.lock();

        let timestamps = requests.entry(identifier.to_string()).or_default();
        timestamps.retain(|ts| now.duration_since(*ts) < self.window);

        if timestamps.len() < self.max_requests {
            timestamps.push(now);
            return Ok(());
        }

        let oldest = timestamps
            .iter()
            .min()
            .copied()
            .unwrap_or(now);
        let elapsed = now.duration_since(oldest);
        let retry_after = self.window.saturating_sub(elapsed);

        Err(retry_after.max(Duration::from_secs(1)))
    }

    /// Remove stale entries to prevent memory growth.
    pub fn cleanup(&self) {
        let now = Instant::now();
        let mut requests = self.requests.lock();
        requests.retain(|_, timestamps| {
            timestamps.retain(|ts| now.duration_since(*ts) < self.window);
            !timestamps.is_empty()
        });
    }

    /// Number of identifiers currently tracked.
    pub fn tracked_identifiers(&self) -> usize {
        self.requests.lock().len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_limit() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));

        assert!(limiter.check("client-a").is_ok());
        assert!(limiter.check("client-a").is_ok());
        assert!(limiter.check("client-a").is_ok());
        assert!(limiter.check("client-a").is_err());
    }

    #[test]
    fn test_identifiers_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));

        assert!(limiter.check("client-a").is_ok());
        assert!(limiter.check("client-a").is_err());
        assert!(limiter.check("client-b").is_ok());
    }

    #[test]
    fn test_rejection_reports_retry_after() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        limiter.check("client-a").unwrap();

        let retry_after = limiter.check("client-a").unwrap_err();
        assert!(retry_after >= Duration::from_secs(1));
        assert!(retry_after <= Duration::from_secs(60));
    }

    #[test]
    fn test_window_expiry_allows_again() {
        let limiter = RateLimiter::new(1, Duration::from_millis(50));
        limiter.check("client-a").unwrap();
        assert!(limiter.check("client-a").is_err());

        std::thread::sleep(Duration::from_millis(60));
        assert!(limiter.check("client-a").is_ok());
    }

    #[test]
    fn test_cleanup_drops_stale_identifiers() {
        let limiter = RateLimiter::new(5, Duration::from_millis(50));
        limiter.check("client-a").unwrap();
        limiter.check("client-b").unwrap();
        assert_eq!(limiter.tracked_identifiers(), 2);

        std::thread::sleep(Duration::from_millis(60));
        limiter.cleanup();
        assert_eq!(limiter.tracked_identifiers(), 0);
    }
}

//! Sliding-window limiter for anonymous report submissions, keyed by device.
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct RateLimiter {
    attempts: Arc<RwLock<HashMap<String, Vec<Instant>>>>,
    max_attempts: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            attempts: Arc::new(RwLock::new(HashMap::new())),
            max_attempts,
            window,
        }
    }

    pub fn per_minute(max_attempts: usize) -> Self {
        Self::new(max_attempts, Duration::from_secs(60))
    }

    /// Records an attempt for `key` and says whether it is within the limit.
    pub async fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut attempts = self.attempts.write().await;

        let history = attempts.entry(key.to_string()).or_default();
        history.retain(|&at| now.duration_since(at) < self.window);

        if history.len() < self.max_attempts {
            history.push(now);
            true
        } else {
            false
        }
    }

    /// Forgets keys with no attempt inside the window. Returns how many were
    /// dropped.
    pub async fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut attempts = self.attempts.write().await;
        let before = attempts.len();

        attempts.retain(|_, history| {
            history.retain(|&at| now.duration_since(at) < self.window);
            !history.is_empty()
        });

        tracing::debug!("Rate limiter cleanup: {} active devices", attempts.len());
        before - attempts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_limit_per_device() {
        let limiter = RateLimiter::per_minute(3);

        assert!(limiter.check("device-a").await);
        assert!(limiter.check("device-a").await);
        assert!(limiter.check("device-a").await);
        assert!(!limiter.check("device-a").await);

        assert!(limiter.check("device-b").await);
    }

    #[tokio::test]
    async fn test_window_expiry_and_cleanup() {
        let limiter = RateLimiter::new(1, Duration::from_millis(50));

        assert!(limiter.check("device-a").await);
        assert!(!limiter.check("device-a").await);
        limiter.check("device-b").await;

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(limiter.check("device-a").await);
        assert_eq!(limiter.cleanup().await, 1);
        assert_eq!(limiter.cleanup().await, 0);
    }
}

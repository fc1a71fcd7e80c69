use std::time::{Duration, Instant};

use dashmap::DashMap;

const MAX_FAILURES: u32 = 5;
const WINDOW: Duration = Duration::from_secs(15 * 60);

/// Failed sign-in counter per email (lowercased).
pub struct LoginRateLimiter {
    /// email -> (failures, first failure in window)
    failures: DashMap<String, (u32, Instant)>,
    max_failures: u32,
    window: Duration,
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginRateLimiter {
    pub fn new() -> Self {
        Self::with_limits(MAX_FAILURES, WINDOW)
    }

    pub fn with_limits(max_failures: u32, window: Duration) -> Self {
        Self {
            failures: DashMap::new(),
            max_failures,
            window,
        }
    }

    /// `Err` carries the time left until the window resets.
    pub fn check(&self, email: &str) -> Result<(), Duration> {
        let key = email.to_lowercase();
        let Some(entry) = self.failures.get(&key) else {
            return Ok(());
        };
        let (count, start) = *entry.value();
        drop(entry);

        let elapsed = start.elapsed();
        if elapsed > self.window {
            self.failures.remove(&key);
            return Ok(());
        }
        if count >= self.max_failures {
            return Err(self.window - elapsed);
        }
        Ok(())
    }

    /// Counts one failure. Windows that have expired for any email are dropped first.
    pub fn record_failure(&self, email: &str) {
        let now = Instant::now();
        self.failures
            .retain(|_, (_, start)| now.duration_since(*start) <= self.window);

        let mut entry = self.failures.entry(email.to_lowercase()).or_insert((0, now));
        let (count, start) = entry.value_mut();
        if now.duration_since(*start) > self.window {
            *count = 0;
            *start = now;
        }
        *count += 1;
    }

    pub fn reset(&self, email: &str) {
        self.failures.remove(&email.to_lowercase());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_after_max_failures() {
        let limiter = LoginRateLimiter::with_limits(3, Duration::from_secs(60));
        for _ in 0..3 {
            assert!(limiter.check("a@b.c").is_ok());
            limiter.record_failure("a@b.c");
        }
        assert!(limiter.check("a@b.c").is_err());
        assert!(limiter.check("A@B.C").is_err(), "email key is case-insensitive");
        assert!(limiter.check("other@b.c").is_ok());
    }

    #[test]
    fn reset_clears_failures() {
        let limiter = LoginRateLimiter::with_limits(1, Duration::from_secs(60));
        limiter.record_failure("a@b.c");
        assert!(limiter.check("a@b.c").is_err());
        limiter.reset("a@b.c");
        assert!(limiter.check("a@b.c").is_ok());
    }

    #[test]
    fn window_expiry_unblocks() {
        let limiter = LoginRateLimiter::with_limits(1, Duration::from_millis(10));
        limiter.record_failure("a@b.c");
        std::thread::sleep(Duration::from_millis(20));
        assert!(limiter.check("a@b.c").is_ok());
    }

    #[test]
    fn expired_emails_are_pruned_on_new_failures() {
        let limiter = LoginRateLimiter::with_limits(5, Duration::from_millis(10));
        for i in 0..50 {
            limiter.record_failure(&format!("user{i}@b.c"));
        }
        assert_eq!(limiter.failures.len(), 50);

        std::thread::sleep(Duration::from_millis(20));
        limiter.record_failure("fresh@b.c");
        assert_eq!(limiter.failures.len(), 1);
        assert!(limiter.failures.contains_key("fresh@b.c"));
    }
}

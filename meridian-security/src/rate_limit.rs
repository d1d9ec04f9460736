// ABOUTME: Failed-authentication lockout table
// ABOUTME: In-process dashmap keyed by principal; resets on process restart

use std::time::{Duration, Instant};

use dashmap::DashMap;

#[derive(Debug, Clone)]
struct Attempts {
    count: u32,
    window_started_at: Instant,
}

/// Tracks failed login attempts per `(tenant_id, user_id)` pair and locks
/// out further attempts once the threshold is crossed within the window.
/// Threshold and window come from `AuthConfig` rather than being hardcoded,
/// so deployments can tune lockout sensitivity.
#[derive(Debug)]
pub struct RateLimiter {
    attempts: DashMap<String, Attempts>,
    max_failures: u32,
    window: Duration,
}

impl RateLimiter {
    #[must_use]
    pub fn new(max_failures: u32, window_minutes: i64) -> Self {
        Self {
            attempts: DashMap::new(),
            max_failures,
            window: Duration::from_secs((window_minutes.max(0) as u64) * 60),
        }
    }

    fn key(tenant_id: &str, user_id: &str) -> String {
        format!("{tenant_id}:{user_id}")
    }

    /// Returns `Some(retry_after_secs)` if the principal is currently
    /// locked out, `None` if the attempt may proceed.
    #[must_use]
    pub fn check(&self, tenant_id: &str, user_id: &str) -> Option<u64> {
        let key = Self::key(tenant_id, user_id);
        let entry = self.attempts.get(&key)?;
        if entry.count < self.max_failures {
            return None;
        }
        let elapsed = entry.window_started_at.elapsed();
        if elapsed >= self.window {
            None
        } else {
            Some((self.window - elapsed).as_secs())
        }
    }

    /// Records a failed attempt, starting or continuing the sliding window.
    pub fn record_failure(&self, tenant_id: &str, user_id: &str) {
        let key = Self::key(tenant_id, user_id);
        let now = Instant::now();
        let window = self.window;
        self.attempts
            .entry(key)
            .and_modify(|a| {
                if now.duration_since(a.window_started_at) >= window {
                    a.count = 1;
                    a.window_started_at = now;
                } else {
                    a.count += 1;
                }
            })
            .or_insert(Attempts {
                count: 1,
                window_started_at: now,
            });
    }

    /// Clears the failure count on a successful authentication.
    pub fn record_success(&self, tenant_id: &str, user_id: &str) {
        self.attempts.remove(&Self::key(tenant_id, user_id));
    }

    /// Drops entries whose window has lapsed. Intended to be called
    /// periodically so the table doesn't grow unbounded.
    pub fn prune_expired(&self) {
        let now = Instant::now();
        let window = self.window;
        self.attempts
            .retain(|_, a| now.duration_since(a.window_started_at) < window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_FAILURES: u32 = 5;

    fn limiter() -> RateLimiter {
        RateLimiter::new(MAX_FAILURES, 15)
    }

    #[test]
    fn allows_attempts_below_threshold() {
        let limiter = limiter();
        for _ in 0..MAX_FAILURES - 1 {
            limiter.record_failure("acme", "alice");
        }
        assert!(limiter.check("acme", "alice").is_none());
    }

    #[test]
    fn locks_out_after_threshold() {
        let limiter = limiter();
        for _ in 0..MAX_FAILURES {
            limiter.record_failure("acme", "alice");
        }
        assert!(limiter.check("acme", "alice").is_some());
    }

    #[test]
    fn success_clears_failures() {
        let limiter = limiter();
        for _ in 0..MAX_FAILURES {
            limiter.record_failure("acme", "alice");
        }
        limiter.record_success("acme", "alice");
        assert!(limiter.check("acme", "alice").is_none());
    }

    #[test]
    fn lockout_is_scoped_per_principal() {
        let limiter = limiter();
        for _ in 0..MAX_FAILURES {
            limiter.record_failure("acme", "alice");
        }
        assert!(limiter.check("acme", "bob").is_none());
        assert!(limiter.check("globex", "alice").is_none());
    }
}

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Fixed-window submission cap per client address.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub max_submissions: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_submissions: 100,
            window: Duration::from_secs(60 * 60),
        }
    }
}

/// In-memory per-address limiter. State is process-local and resets on
/// restart; abuse control across replicas is out of scope here. Expired
/// windows are pruned on every call so the map tracks only addresses seen
/// within the current window.
pub struct SubmissionRateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<String, Window>>,
}

struct Window {
    count: u32,
    opened_at: Instant,
}

impl SubmissionRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record one attempt from `address`. Returns `false` when the address
    /// has exhausted its window; a limited attempt is not counted.
    pub fn allow(&self, address: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().expect("limiter mutex poisoned");

        windows.retain(|_, window| now.duration_since(window.opened_at) <= self.config.window);

        match windows.get_mut(address) {
            Some(window) => {
                if window.count >= self.config.max_submissions {
                    return false;
                }
                window.count += 1;
                true
            }
            None => {
                windows.insert(
                    address.to_string(),
                    Window {
                        count: 1,
                        opened_at: now,
                    },
                );
                true
            }
        }
    }
}

impl Default for SubmissionRateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_configured_maximum() {
        let limiter = SubmissionRateLimiter::new(RateLimitConfig {
            max_submissions: 3,
            window: Duration::from_secs(3600),
        });

        assert!(limiter.allow("203.0.113.9"));
        assert!(limiter.allow("203.0.113.9"));
        assert!(limiter.allow("203.0.113.9"));
        assert!(!limiter.allow("203.0.113.9"));
    }

    #[test]
    fn addresses_are_limited_independently() {
        let limiter = SubmissionRateLimiter::new(RateLimitConfig {
            max_submissions: 1,
            window: Duration::from_secs(3600),
        });

        assert!(limiter.allow("203.0.113.9"));
        assert!(!limiter.allow("203.0.113.9"));
        assert!(limiter.allow("198.51.100.4"));
    }

    #[test]
    fn expired_windows_are_evicted_from_the_map() {
        let limiter = SubmissionRateLimiter::new(RateLimitConfig {
            max_submissions: 1,
            window: Duration::from_millis(10),
        });

        assert!(limiter.allow("203.0.113.9"));
        assert!(limiter.allow("198.51.100.4"));
        std::thread::sleep(Duration::from_millis(20));
        assert!(limiter.allow("192.0.2.7"));

        let tracked = limiter.windows.lock().expect("limiter mutex poisoned").len();
        assert_eq!(tracked, 1, "only the live window remains");
    }

    #[test]
    fn window_expiry_resets_the_count() {
        let limiter = SubmissionRateLimiter::new(RateLimitConfig {
            max_submissions: 1,
            window: Duration::from_millis(10),
        });

        assert!(limiter.allow("203.0.113.9"));
        assert!(!limiter.allow("203.0.113.9"));
        std::thread::sleep(Duration::from_millis(20));
        assert!(limiter.allow("203.0.113.9"));
    }
}

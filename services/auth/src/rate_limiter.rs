//! Rate limiter for captcha sends, captcha guesses and password logins

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::info;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum number of attempts allowed inside one window
    pub max_attempts: u32,
    /// Time window in seconds
    pub window_seconds: u64,
    /// Ban duration in seconds
    pub ban_duration_seconds: u64,
}

impl RateLimiterConfig {
    /// Captcha sends: 5 per 10 minutes, then a 30 minute ban
    pub fn captcha() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 600,
            ban_duration_seconds: 1800,
        }
    }

    /// Password logins and captcha guesses: 5 per 5 minutes, then a 1 hour ban
    pub fn login() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 300,
            ban_duration_seconds: 3600,
        }
    }
}

/// Rate limiter entry
#[derive(Debug)]
struct RateLimiterEntry {
    /// Number of attempts
    attempts: u32,
    /// Last attempt time
    last_attempt: Instant,
    /// Ban expiration time
    ban_expires: Option<Instant>,
}

/// In-process rate limiter keyed by an arbitrary string (usually a phone)
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<HashMap<String, RateLimiterEntry>>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record an attempt for `key` and report whether it may proceed
    pub async fn is_allowed(&self, key: &str) -> bool {
        self.is_allowed_at(key, Instant::now()).await
    }

    async fn is_allowed_at(&self, key: &str, now: Instant) -> bool {
        let mut entries = self.entries.lock().await;

        let entry = entries.entry(key.to_string()).or_insert(RateLimiterEntry {
            attempts: 0,
            last_attempt: now,
            ban_expires: None,
        });

        if let Some(ban_expires) = entry.ban_expires {
            if now < ban_expires {
                return false;
            }
            entry.attempts = 0;
            entry.ban_expires = None;
        }

        if now.duration_since(entry.last_attempt) >= Duration::from_secs(self.config.window_seconds)
        {
            entry.attempts = 0;
        }

        if entry.attempts >= self.config.max_attempts {
            entry.ban_expires = Some(now + Duration::from_secs(self.config.ban_duration_seconds));
            info!(
                "Banned key {} for {} seconds",
                key, self.config.ban_duration_seconds
            );
            return false;
        }

        entry.attempts += 1;
        entry.last_attempt = now;

        true
    }

    /// Forget the attempts recorded for `key`
    pub async fn reset(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }

    /// Drop entries that are neither banned nor inside their window
    pub async fn purge_idle(&self) -> usize {
        self.purge_idle_at(Instant::now()).await
    }

    async fn purge_idle_at(&self, now: Instant) -> usize {
        let window = Duration::from_secs(self.config.window_seconds);
        let mut entries = self.entries.lock().await;
        let before = entries.len();

        entries.retain(|_, entry| match entry.ban_expires {
            Some(ban_expires) => now < ban_expires,
            None => now.duration_since(entry.last_attempt) < window,
        });

        before - entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RateLimiter {
        RateLimiter::new(RateLimiterConfig {
            max_attempts: 3,
            window_seconds: 60,
            ban_duration_seconds: 600,
        })
    }

    #[tokio::test]
    async fn test_allows_up_to_max_attempts_then_bans() {
        let limiter = limiter();
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.is_allowed_at("13900000000", now).await);
        }
        assert!(!limiter.is_allowed_at("13900000000", now).await);

        // Still banned after the window, until the ban runs out
        let later = now + Duration::from_secs(120);
        assert!(!limiter.is_allowed_at("13900000000", later).await);

        let after_ban = now + Duration::from_secs(601);
        assert!(limiter.is_allowed_at("13900000000", after_ban).await);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = limiter();
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.is_allowed_at("a", now).await);
        }
        assert!(!limiter.is_allowed_at("a", now).await);
        assert!(limiter.is_allowed_at("b", now).await);
    }

    #[tokio::test]
    async fn test_reset_clears_attempts() {
        let limiter = limiter();

        for _ in 0..3 {
            assert!(limiter.is_allowed("a").await);
        }
        limiter.reset("a").await;
        assert!(limiter.is_allowed("a").await);
    }

    #[tokio::test]
    async fn test_purge_idle_keeps_banned_and_recent_entries() {
        let limiter = limiter();
        let now = Instant::now();

        assert!(limiter.is_allowed_at("idle", now).await);
        for _ in 0..4 {
            limiter.is_allowed_at("banned", now).await;
        }

        let later = now + Duration::from_secs(120);
        assert!(limiter.is_allowed_at("recent", later).await);

        assert_eq!(limiter.purge_idle_at(later).await, 1);
        assert!(!limiter.is_allowed_at("banned", later).await);
    }
}

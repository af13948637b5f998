//! Client-side request throttling
//!
//! Forecast enforces a per-key request quota; a governor token bucket keeps
//! the tap under it so fan-out streams don't trip 429s.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Request quota for one API key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,
    /// Requests allowed back to back before throttling starts
    pub burst_size: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::per_second(10)
    }
}

impl RateLimiterConfig {
    /// A quota of `requests_per_second` that may be spent in one burst
    pub fn per_second(requests_per_second: u32) -> Self {
        Self {
            requests_per_second,
            burst_size: requests_per_second,
        }
    }

    /// Cap bursts below the sustained rate
    #[must_use]
    pub fn with_burst(mut self, burst_size: u32) -> Self {
        self.burst_size = burst_size;
        self
    }

    fn quota(&self) -> Quota {
        let rps = NonZeroU32::new(self.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(self.burst_size).unwrap_or(NonZeroU32::MIN);
        Quota::per_second(rps).allow_burst(burst)
    }
}

/// Token bucket shared by every request of a run
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
    config: RateLimiterConfig,
}

impl RateLimiter {
    /// Build a limiter for `config`
    pub fn new(config: &RateLimiterConfig) -> Self {
        Self {
            limiter: Arc::new(Governor::direct(config.quota())),
            config: *config,
        }
    }

    /// Quota this limiter enforces
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    /// Wait for a permit
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Take a permit if one is free right now
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("requests_per_second", &self.config.requests_per_second)
            .field("burst_size", &self.config.burst_size)
            .finish()
    }
}

#[cfg(test)]
mod rate_limit_tests {
    use super::*;
    use crate::config::TapConfig;
    use crate::http::HttpClientConfig;

    #[test]
    fn test_quota_follows_tap_config() {
        let config = TapConfig::from_json(
            r#"{"api_key": "k", "start_date": "2020-01-01", "requests_per_second": 3}"#,
        )
        .unwrap();

        let quota = HttpClientConfig::from_tap_config(&config).rate_limit.unwrap();
        assert_eq!(quota, RateLimiterConfig::per_second(3));

        let limiter = RateLimiter::new(&quota);
        for _ in 0..3 {
            assert!(limiter.try_acquire());
        }
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn test_default_quota_matches_default_config() {
        let config = TapConfig::from_json(r#"{"api_key": "k", "start_date": "2020-01-01"}"#).unwrap();
        assert_eq!(
            HttpClientConfig::from_tap_config(&config).rate_limit,
            Some(RateLimiterConfig::default())
        );
    }

    #[test]
    fn test_burst_below_rate() {
        let limiter = RateLimiter::new(&RateLimiterConfig::per_second(10).with_burst(2));
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
        assert_eq!(limiter.config().requests_per_second, 10);
    }

    #[tokio::test]
    async fn test_wait_within_burst() {
        let limiter = RateLimiter::new(&RateLimiterConfig::per_second(100));
        limiter.wait().await;
        assert!(format!("{limiter:?}").contains("requests_per_second: 100"));
    }
}

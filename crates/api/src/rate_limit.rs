//! Redis-backed fixed-window rate limiting.
//!
//! Counters live in Redis keyed on `(action, voter key, window index)`, so
//! every server instance charges against the same budget. The window index
//! is the Unix timestamp divided by the window length; keys expire with
//! their window and Redis cleans them up.

use std::sync::Arc;

use chrono::Utc;
use fred::clients::Client as RedisClient;
use fred::interfaces::KeysInterface;
use tierboard_common::{AppError, AppResult};

/// Budget for one action class.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitQuota {
    /// Accepted requests per window.
    pub max: u64,
    /// Window length in seconds.
    pub window_secs: i64,
}

impl RateLimitQuota {
    /// Create a new quota.
    #[must_use]
    pub const fn new(max: u64, window_secs: i64) -> Self {
        Self { max, window_secs }
    }
}

/// Distributed rate limiter.
#[derive(Clone)]
pub struct RateLimiter {
    redis: Arc<RedisClient>,
    prefix: String,
    fail_open: bool,
}

impl RateLimiter {
    /// Create a new rate limiter.
    ///
    /// `fail_open` decides what happens when the counter store is
    /// unreachable: allow the request (availability) or reject it
    /// (abuse protection).
    #[must_use]
    pub fn new(redis: Arc<RedisClient>, prefix: impl Into<String>, fail_open: bool) -> Self {
        Self {
            redis,
            prefix: prefix.into(),
            fail_open,
        }
    }

    /// Charge one unit against `key` and reject when the quota is spent.
    ///
    /// The charge happens before any further request processing, so
    /// rejected submissions still consume budget.
    pub async fn check(&self, action: &str, key: &str, quota: RateLimitQuota) -> AppResult<()> {
        let window = current_window(quota.window_secs);
        let redis_key = format!("{}:rate:{action}:{key}:{window}", self.prefix);

        let count: u64 = match self.redis.incr(redis_key.clone()).await {
            Ok(count) => count,
            Err(e) => return self.counter_unavailable(&e),
        };

        // Set expiry on first increment
        if count == 1
            && let Err(e) = self
                .redis
                .expire::<(), _>(redis_key.clone(), quota.window_secs, None)
                .await
        {
            return self.counter_unavailable(&e);
        }

        if count > quota.max {
            let ttl: i64 = self.redis.ttl(redis_key).await.unwrap_or(quota.window_secs);
            tracing::debug!(
                action = %action,
                count,
                limit = quota.max,
                ttl,
                "rate limit exceeded"
            );
            return evaluate(count, quota, ttl);
        }

        Ok(())
    }

    fn counter_unavailable(&self, e: &fred::error::Error) -> AppResult<()> {
        if self.fail_open {
            tracing::warn!(error = %e, "rate limit counter unreachable, allowing request");
            Ok(())
        } else {
            tracing::warn!(error = %e, "rate limit counter unreachable, rejecting request");
            Err(AppError::StorageUnavailable(
                "rate limit counter unreachable".to_string(),
            ))
        }
    }
}

/// Get the current time window index.
fn current_window(window_secs: i64) -> i64 {
    Utc::now().timestamp() / window_secs
}

/// Decide whether a counter reading stays within its quota.
///
/// `ttl` is the remaining lifetime of the counter key; a non-positive
/// value (key expired between increment and read) falls back to a full
/// window.
fn evaluate(count: u64, quota: RateLimitQuota, ttl: i64) -> AppResult<()> {
    if count <= quota.max {
        return Ok(());
    }
    let retry_after = if ttl > 0 { ttl } else { quota.window_secs };
    Err(AppError::RateLimited {
        retry_after_secs: retry_after as u64,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_current_window_is_stable() {
        let window1 = current_window(60);
        let window2 = current_window(60);
        assert_eq!(window1, window2);
    }

    #[test]
    fn test_shorter_windows_advance_faster() {
        let short = current_window(1);
        let long = current_window(3600);
        assert!(short > long);
    }

    #[test]
    fn test_quota_construction() {
        let quota = RateLimitQuota::new(10, 60);
        assert_eq!(quota.max, 10);
        assert_eq!(quota.window_secs, 60);
    }

    #[test]
    fn test_within_quota_is_allowed() {
        let quota = RateLimitQuota::new(10, 60);
        assert!(evaluate(1, quota, 60).is_ok());
        assert!(evaluate(10, quota, 1).is_ok());
    }

    #[test]
    fn test_over_quota_is_rejected_with_remaining_window() {
        let quota = RateLimitQuota::new(1, 60);
        match evaluate(2, quota, 42) {
            Err(AppError::RateLimited { retry_after_secs }) => {
                assert_eq!(retry_after_secs, 42);
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[test]
    fn test_expired_ttl_falls_back_to_full_window() {
        let quota = RateLimitQuota::new(1, 60);
        for ttl in [0, -1, -2] {
            match evaluate(5, quota, ttl) {
                Err(AppError::RateLimited { retry_after_secs }) => {
                    assert_eq!(retry_after_secs, 60);
                }
                other => panic!("expected RateLimited, got {other:?}"),
            }
        }
    }
}

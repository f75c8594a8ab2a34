use crate::{RateLimitStatus, RateLimiter};
use app_error::AppError;
use async_trait::async_trait;
use deadpool_redis::{
    Config, Pool, Runtime,
    redis::{Pipeline, cmd, pipe},
};
use std::time::Duration;
use tracing::*;

const KEY_PREFIX: &str = "command:rate_limit";

/// Fixed-window limiter shared across instances through Redis.
///
/// Each increment runs in one `MULTI` block that first creates the key with
/// its TTL (`SET NX EX`), so a counter never exists without an expiry. The key
/// vanishing starts the next window. Redis errors fail open.
pub struct RedisRateLimiter {
    pool: Pool,
    limit: u32,
    window: Duration,
}

impl RedisRateLimiter {
    pub fn new(pool: Pool, limit: u32, window: Duration) -> Self {
        Self {
            pool,
            limit,
            window,
        }
    }

    pub fn connect(url: &str, limit: u32, window: Duration) -> Result<Self, AppError> {
        let pool = Config::from_url(url).create_pool(Some(Runtime::Tokio1))?;
        Ok(Self::new(pool, limit, window))
    }

    pub fn key(user: &str) -> String {
        format!("{}:{}", KEY_PREFIX, user)
    }

    async fn used(&self, user: &str) -> Result<u64, AppError> {
        let mut conn = self.pool.get().await?;
        let used: Option<u64> = cmd("GET")
            .arg(Self::key(user))
            .query_async(&mut conn)
            .await?;
        Ok(used.unwrap_or(0))
    }

    /// `SET key 0 EX window NX`, `INCR key`, `TTL key` as one transaction.
    pub fn increment_pipeline(key: &str, window: Duration) -> Pipeline {
        let mut pipeline = pipe();
        pipeline
            .atomic()
            .cmd("SET")
            .arg(key)
            .arg(0)
            .arg("EX")
            .arg(window.as_secs().max(1))
            .arg("NX")
            .ignore()
            .cmd("INCR")
            .arg(key)
            .cmd("TTL")
            .arg(key);
        pipeline
    }

    async fn increment(&self, user: &str) -> Result<RateLimitStatus, AppError> {
        let key = Self::key(user);
        let mut conn = self.pool.get().await?;
        let (used, ttl): (u64, i64) = Self::increment_pipeline(&key, self.window)
            .query_async(&mut conn)
            .await?;
        if needs_expiry(ttl) {
            // Counter left behind without a TTL; give it one.
            warn!("Rate limit key {} had no expiry", &key);
            let _: () = cmd("EXPIRE")
                .arg(&key)
                .arg(self.window.as_secs().max(1))
                .query_async(&mut conn)
                .await?;
        }
        if used > u64::from(self.limit) {
            // Give the slot back so a blocked call does not count.
            let _: i64 = cmd("DECR").arg(&key).query_async(&mut conn).await?;
            return Ok(RateLimitStatus::from_usage(used - 1, self.limit));
        }
        Ok(RateLimitStatus {
            allowed: true,
            ..RateLimitStatus::from_usage(used, self.limit)
        })
    }

    async fn decrement(&self, user: &str) -> Result<(), AppError> {
        let key = Self::key(user);
        let mut conn = self.pool.get().await?;
        let left: i64 = cmd("DECR").arg(&key).query_async(&mut conn).await?;
        if left < 0 {
            // The window expired in between and DECR recreated the key.
            let _: () = cmd("DEL").arg(&key).query_async(&mut conn).await?;
        }
        Ok(())
    }
}

/// `TTL` answers -1 for a key that exists without an expiry.
fn needs_expiry(ttl: i64) -> bool {
    ttl == -1
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn status(&self, user: &str) -> RateLimitStatus {
        match self.used(user).await {
            Ok(used) => RateLimitStatus::from_usage(used, self.limit),
            Err(e) => {
                warn!("Rate limit lookup failed, allowing request: {}", e.message);
                RateLimitStatus::open(self.limit)
            }
        }
    }

    async fn acquire(&self, user: &str) -> RateLimitStatus {
        match self.increment(user).await {
            Ok(status) => status,
            Err(e) => {
                warn!("Rate limit update failed, allowing request: {}", e.message);
                RateLimitStatus::open(self.limit)
            }
        }
    }

    async fn release(&self, user: &str) {
        if let Err(e) = self.decrement(user).await {
            warn!("Rate limit release failed: {}", e.message);
        }
    }
}

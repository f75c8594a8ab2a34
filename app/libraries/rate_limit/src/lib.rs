//! Per-user request quotas for the chat endpoint.
//!
//! Each user key gets `limit` requests per fixed window. Requests without a
//! user id share the [`ANONYMOUS_USER`] bucket.

pub mod memory;
pub mod redis;

use app_config::AppConfig;
use app_error::AppError;
use async_trait::async_trait;
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tracing::*;

pub use memory::MemoryRateLimiter;
pub use redis::RedisRateLimiter;

pub const ANONYMOUS_USER: &str = "anonymous";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitStatus {
    pub allowed: bool,
    pub remaining: u32,
    pub limit: u32,
}

impl RateLimitStatus {
    /// Status after `used` requests in the current window.
    pub fn from_usage(used: u64, limit: u32) -> Self {
        let remaining = u64::from(limit).saturating_sub(used) as u32;
        Self {
            allowed: used < u64::from(limit),
            remaining,
            limit,
        }
    }

    /// Unrestricted status reported when the backing store is unreachable.
    pub fn open(limit: u32) -> Self {
        Self {
            allowed: true,
            remaining: limit,
            limit,
        }
    }
}

/// Normalizes an optional user id into a bucket key.
pub fn user_key(user_id: Option<&str>) -> &str {
    match user_id.map(str::trim) {
        Some(id) if !id.is_empty() => id,
        _ => ANONYMOUS_USER,
    }
}

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Current status without consuming a request.
    async fn status(&self, user: &str) -> RateLimitStatus;

    /// Consumes one request. `allowed` is false when the quota was already
    /// spent; in that case nothing is consumed.
    async fn acquire(&self, user: &str) -> RateLimitStatus;

    /// Hands back one request taken by `acquire` in the current window.
    async fn release(&self, user: &str);
}

/// Redis when `redis_url` is configured, in-process otherwise.
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn RateLimiter>, AppError> {
    let window = Duration::from_secs(config.rate_limit_window_secs);
    match config.redis_url.as_deref() {
        Some(url) if !url.trim().is_empty() => {
            info!("Rate limiting through Redis");
            Ok(Arc::new(RedisRateLimiter::connect(
                url,
                config.rate_limit_requests,
                window,
            )?))
        }
        _ => {
            info!("Rate limiting in process");
            Ok(Arc::new(MemoryRateLimiter::new(
                config.rate_limit_requests,
                window,
            )))
        }
    }
}

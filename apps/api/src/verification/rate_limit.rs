use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;

use crate::errors::AppError;

/// Fixed-window request counter.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Records one hit for `key`; returns `false` once more than `limit` hits fall in the window.
    async fn allow(&self, key: &str, limit: u64, window: Duration) -> Result<bool, AppError>;
}

/// Fixed window on Redis. `SET NX EX` creates the counter together with its expiry and
/// `INCR` counts the hit, both inside one `MULTI`, so a counter never exists without a TTL.
#[derive(Clone)]
pub struct RedisRateLimiter {
    client: redis::Client,
    timeout: Duration,
}

impl RedisRateLimiter {
    pub fn new(client: redis::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    async fn hit(&self, key: &str, window: Duration) -> Result<u64, AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let (count,): (u64,) = window_pipeline(key, window)
            .query_async(&mut conn)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn allow(&self, key: &str, limit: u64, window: Duration) -> Result<bool, AppError> {
        let count = tokio::time::timeout(self.timeout, self.hit(key, window))
            .await
            .map_err(|_| AppError::Internal(anyhow!("Redis rate limiter timed out")))??;
        Ok(count <= limit)
    }
}

fn window_pipeline(key: &str, window: Duration) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .cmd("SET")
        .arg(key)
        .arg(0)
        .arg("EX")
        .arg(window.as_secs().max(1))
        .arg("NX")
        .ignore()
        .incr(key, 1);
    pipe
}

/// Redis key for code-issue counting.
pub fn code_request_key(email: &str) -> String {
    format!("verification:issue:{email}")
}

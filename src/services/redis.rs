//! Redis-backed request rate limiting
//!
//! Fixed-window counter per client IP. Redis being down must never take the
//! desk offline, so every limiter error fails open.

use redis::{aio::MultiplexedConnection, AsyncCommands, Client};

use crate::{
    config::{RateLimitConfig, RedisConfig},
    error::{AppError, AppResult},
};

#[derive(Clone)]
pub struct RedisService {
    connection: MultiplexedConnection,
    config: RateLimitConfig,
}

impl RedisService {
    pub async fn connect(redis: &RedisConfig, config: RateLimitConfig) -> AppResult<Self> {
        let client = Client::open(redis.url.as_str())
            .map_err(|e| AppError::Internal(format!("Invalid Redis URL: {}", e)))?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        tracing::info!("Connected to Redis");
        Ok(Self { connection, config })
    }

    /// Count a request against the client's current window. Returns false
    /// when the client exceeded the configured budget.
    pub async fn allow_request(&self, client_ip: &str) -> bool {
        let mut conn = self.connection.clone();
        let key = format!("ratelimit:{}", client_ip);

        let count: Result<u32, redis::RedisError> = conn.incr(&key, 1u32).await;
        match count {
            Ok(1) => {
                // First hit opens the window
                if let Err(e) = conn
                    .expire::<_, ()>(&key, self.config.window_seconds as i64)
                    .await
                {
                    tracing::warn!("Failed to set rate limit window: {}", e);
                }
                true
            }
            Ok(n) => n <= self.config.max_requests,
            Err(e) => {
                tracing::warn!("Rate limiter unavailable, allowing request: {}", e);
                true
            }
        }
    }
}

//! Redis cache module for the coin admin backend
//!
//! The cache holds the revocation list for bearer tokens: a token is
//! revoked while `blacklisted_token:<token>` exists.

use anyhow::Result;
use redis::{AsyncCommands, Client};
use tracing::info;

const REVOKED_TOKEN_PREFIX: &str = "blacklisted_token";

/// Configuration for Redis connection
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
}

impl RedisConfig {
    /// Create a new RedisConfig from environment variables
    ///
    /// # Environment Variables
    /// - `REDIS_URL`: Redis connection URL (default: "redis://localhost:6379")
    pub fn from_env() -> Result<Self> {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        Ok(RedisConfig { url })
    }
}

/// Redis client handle, cheap to clone into request state
#[derive(Clone)]
pub struct RedisPool {
    client: Client,
}

impl RedisPool {
    /// Initialize a new Redis client
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.clone())?;
        info!("Redis client initialized with URL: {}", config.url);
        Ok(RedisPool { client })
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        let conn = self.client.get_multiplexed_async_connection().await?;
        Ok(conn)
    }

    /// Put a token on the revocation list until it would have expired anyway
    pub async fn revoke_token(&self, token: &str, ttl_seconds: u64) -> Result<()> {
        // SETEX rejects a zero TTL
        let ttl = ttl_seconds.max(1);
        let mut conn = self.get_connection().await?;
        let _: () = conn.set_ex(revoked_token_key(token), "1", ttl).await?;
        Ok(())
    }

    /// Whether a token is on the revocation list
    pub async fn is_token_revoked(&self, token: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let exists: bool = conn.exists(revoked_token_key(token)).await?;
        Ok(exists)
    }

    /// Check if Redis is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}

fn revoked_token_key(token: &str) -> String {
    format!("{}:{}", REVOKED_TOKEN_PREFIX, token)
}

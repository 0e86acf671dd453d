//! Redis cache module for the Inkwell services
//!
//! This module owns the process-wide Redis connection and exposes the small
//! set of sorted-set operations the services need. The connection is opened
//! lazily on first use and reconnects with exponential backoff, so a cache
//! outage surfaces as per-command errors rather than a failed start-up.

use anyhow::Result;
use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{error, info};

/// Configuration for Redis connection
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
    /// Timeout for establishing a connection, in milliseconds
    pub connection_timeout_ms: u64,
    /// Timeout for a single command, in milliseconds
    pub response_timeout_ms: u64,
    /// Reconnect attempts before a command fails
    pub max_retries: usize,
}

impl RedisConfig {
    /// Create a new RedisConfig from environment variables
    ///
    /// # Environment Variables
    /// - `REDIS_URL`: Redis connection URL (default: "redis://localhost:6379")
    /// - `REDIS_CONNECTION_TIMEOUT_MS`: Connect timeout (default: 10000)
    /// - `REDIS_RESPONSE_TIMEOUT_MS`: Command timeout (default: 5000)
    /// - `REDIS_MAX_RETRIES`: Reconnect attempts (default: 3)
    pub fn from_env() -> Result<Self> {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let connection_timeout_ms = std::env::var("REDIS_CONNECTION_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10_000);
        let response_timeout_ms = std::env::var("REDIS_RESPONSE_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5_000);
        let max_retries = std::env::var("REDIS_MAX_RETRIES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3);

        Ok(RedisConfig {
            url,
            connection_timeout_ms,
            response_timeout_ms,
            max_retries,
        })
    }

    fn manager_config(&self) -> ConnectionManagerConfig {
        ConnectionManagerConfig::new()
            .set_connection_timeout(Duration::from_millis(self.connection_timeout_ms))
            .set_response_timeout(Duration::from_millis(self.response_timeout_ms))
            .set_number_of_retries(self.max_retries)
            .set_max_delay(2_000)
    }
}

/// Shared Redis handle
#[derive(Clone)]
pub struct RedisPool {
    client: Client,
    config: RedisConfig,
    manager: Arc<OnceCell<ConnectionManager>>,
}

impl RedisPool {
    /// Create the pool without connecting
    pub fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.clone())?;
        info!("Redis client initialized with URL: {}", config.url);
        Ok(RedisPool {
            client,
            config: config.clone(),
            manager: Arc::new(OnceCell::new()),
        })
    }

    /// Get the shared connection, establishing it on first use
    async fn get_connection(&self) -> Result<ConnectionManager> {
        let manager = self
            .manager
            .get_or_try_init(|| async {
                self.client
                    .get_connection_manager_with_config(self.config.manager_config())
                    .await
            })
            .await?;
        Ok(manager.clone())
    }

    /// Add scored members to a sorted set, keep only the `cap` highest scores
    /// and refresh the key's expiry. Runs as one MULTI/EXEC pipeline.
    pub async fn add_scored_capped(
        &self,
        key: &str,
        entries: &[(f64, String)],
        cap: usize,
        ttl_seconds: u64,
    ) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut conn = self.get_connection().await?;
        let _: () = redis::pipe()
            .atomic()
            .zadd_multiple(key, entries)
            .ignore()
            .zremrangebyrank(key, 0, -(cap as isize) - 1)
            .ignore()
            .expire(key, ttl_seconds as i64)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(())
    }

    /// Members of a sorted set, highest score first
    pub async fn newest_members(&self, key: &str, limit: usize) -> Result<Vec<String>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self.get_connection().await?;
        let members: Vec<String> = conn.zrevrange(key, 0, limit as isize - 1).await?;
        Ok(members)
    }

    /// Remove one member from a sorted set
    pub async fn remove_member(&self, key: &str, member: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let _: u64 = conn.zrem(key, member).await?;
        Ok(())
    }

    /// Delete a key from Redis
    pub async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let _: u64 = conn.del(key).await?;
        Ok(())
    }

    /// Check if Redis is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let mut conn = match self.get_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("Redis health check failed: {}", e);
                return Ok(false);
            }
        };

        match redis::cmd("PING").query_async::<String>(&mut conn).await {
            Ok(reply) => Ok(reply == "PONG"),
            Err(e) => {
                error!("Redis health check failed: {}", e);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_redis_config_defaults() {
        unsafe {
            std::env::remove_var("REDIS_URL");
            std::env::remove_var("REDIS_CONNECTION_TIMEOUT_MS");
            std::env::remove_var("REDIS_RESPONSE_TIMEOUT_MS");
            std::env::remove_var("REDIS_MAX_RETRIES");
        }

        let config = RedisConfig::from_env().unwrap();
        assert_eq!(config.url, "redis://localhost:6379");
        assert_eq!(config.connection_timeout_ms, 10_000);
        assert_eq!(config.response_timeout_ms, 5_000);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_pool_creation_is_lazy() {
        let config = RedisConfig {
            url: "redis://127.0.0.1:1".to_string(),
            connection_timeout_ms: 100,
            response_timeout_ms: 100,
            max_retries: 0,
        };

        assert!(RedisPool::new(&config).is_ok());
    }

    #[test]
    fn test_pool_rejects_malformed_url() {
        let config = RedisConfig {
            url: "not a redis url".to_string(),
            connection_timeout_ms: 100,
            response_timeout_ms: 100,
            max_retries: 0,
        };

        assert!(RedisPool::new(&config).is_err());
    }
}

//! Redis title cache (one set per key, SADD / SMEMBERS)

use anyhow::{Context, Result};
use async_trait::async_trait;
use item_core::ports::TitleCache;
use item_core::StoreError;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::collections::HashSet;

pub struct RedisTitleCache {
    conn: ConnectionManager,
}

impl RedisTitleCache {
    pub async fn new(redis_url: &str) -> Result<Self> {
        tracing::info!("Connecting to Redis...");

        let client = redis::Client::open(redis_url).context("Invalid Redis URL")?;
        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        tracing::info!("Redis connection established");

        Ok(Self { conn })
    }
}

fn store_error(e: redis::RedisError) -> StoreError {
    if e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() || e.is_timeout()
    {
        StoreError::Unavailable(e.to_string())
    } else {
        StoreError::Backend(e.to_string())
    }
}

#[async_trait]
impl TitleCache for RedisTitleCache {
    async fn add_member(&self, set_key: &str, title: &str) -> Result<(), StoreError> {
        // ConnectionManager is a cheap handle onto one multiplexed connection
        let mut conn = self.conn.clone();
        let _added: i64 = conn.sadd(set_key, title).await.map_err(store_error)?;
        Ok(())
    }

    async fn list_members(&self, set_key: &str) -> Result<HashSet<String>, StoreError> {
        let mut conn = self.conn.clone();
        conn.smembers(set_key).await.map_err(store_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_are_connection_failures() {
        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(store_error(redis::RedisError::from(refused)).is_connection_failure());

        let reset = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(store_error(redis::RedisError::from(reset)).is_connection_failure());
    }

    #[test]
    fn test_type_errors_are_backend_errors() {
        let wrong_type = redis::RedisError::from((
            redis::ErrorKind::TypeError,
            "WRONGTYPE Operation against a key holding the wrong kind of value",
        ));
        assert!(matches!(store_error(wrong_type), StoreError::Backend(_)));
    }
}

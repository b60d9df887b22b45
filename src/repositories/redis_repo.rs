//! Redis-backed session storage.

use async_trait::async_trait;
use redis::AsyncCommands;
use std::sync::Arc;
use tracing::debug;

use super::SessionStore;
use crate::error::AppError;
use crate::models::SessionData;

const SESSION_PREFIX: &str = "wallet:session:";

fn session_key(key: &str) -> String {
    format!("{}{}", SESSION_PREFIX, key)
}

/// Session records as JSON strings under `wallet:session:<key>` with a TTL.
#[derive(Clone)]
pub struct RedisSessionStore {
    client: Arc<redis::Client>,
}

impl RedisSessionStore {
    /// Create store from Redis URL.
    pub fn new(redis_url: &str) -> Result<Self, AppError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Get a multiplexed connection for commands.
    pub async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, AppError> {
        let conn = self.client.get_multiplexed_async_connection().await?;
        Ok(conn)
    }

    /// Round-trip a PING; used at startup to fail fast on a bad URL.
    pub async fn ping(&self) -> Result<(), AppError> {
        let mut conn = self.connection().await?;
        redis::cmd("PING").query_async::<_, ()>(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, key: &str) -> Result<Option<SessionData>, AppError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.get(session_key(key)).await?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, key: &str, data: &SessionData, ttl_seconds: u64) -> Result<(), AppError> {
        let mut conn = self.connection().await?;
        let payload = serde_json::to_string(data)?;
        redis::cmd("SET")
            .arg(session_key(key))
            .arg(payload)
            .arg("EX")
            .arg(ttl_seconds)
            .query_async::<_, ()>(&mut conn)
            .await?;
        debug!(ttl_seconds, "session saved");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(session_key(key)).await?;
        Ok(())
    }
}

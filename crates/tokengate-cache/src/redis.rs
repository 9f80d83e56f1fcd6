//! Redis-backed session store.

use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, instrument};

use crate::store::{SessionStore, StoreError, ttl_millis};

/// Session store over a shared, auto-reconnecting Redis connection.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSessionStore").finish_non_exhaustive()
    }
}

impl RedisSessionStore {
    /// Connects to Redis at `redis_url` (e.g. `redis://localhost:6379`).
    pub async fn new(redis_url: &str) -> Result<Self, StoreError> {
        let client = Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    #[instrument(skip(self), fields(store.operation = "GET"))]
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;

        debug!(store.key = %key, store.hit = value.is_some(), "Session lookup");
        Ok(value)
    }

    #[instrument(skip(self, value), fields(store.operation = "PSETEX"))]
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StoreError> {
        let ms = ttl_millis(ttl)?;
        let mut conn = self.conn.clone();

        conn.pset_ex::<_, _, ()>(key, value, ms).await?;

        debug!(store.key = %key, store.ttl_ms = ms, "Session stored");
        Ok(())
    }

    #[instrument(skip(self), fields(store.operation = "PEXPIRE"))]
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let ms = ttl_millis(ttl)?;
        let mut conn = self.conn.clone();

        let updated: bool = conn.pexpire(key, ms as i64).await?;

        debug!(store.key = %key, store.ttl_ms = ms, store.updated = updated, "Session TTL reset");
        Ok(updated)
    }

    #[instrument(skip(self), fields(store.operation = "DEL"))]
    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();

        conn.del::<_, ()>(key).await?;

        debug!(store.key = %key, "Session deleted");
        Ok(())
    }
}

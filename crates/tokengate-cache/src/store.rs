//! Session store abstraction.

use std::time::Duration;

use async_trait::async_trait;

/// Error type for session store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Invalid TTL: {0:?}")]
    InvalidTtl(Duration),
}

/// Byte-string key/value store with per-key expiry.
///
/// Implementations are shared by every request handler and must tolerate
/// concurrent calls. Writes are last-write-wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the stored bytes, or `None` when the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value and TTL.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StoreError>;

    /// Resets the TTL of an existing key. Returns `false` when the key is absent.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError>;

    /// Removes `key`. Absent keys are not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Milliseconds for a TTL, rejecting zero (which stores would treat as "delete now"
/// or reject outright).
pub(crate) fn ttl_millis(ttl: Duration) -> Result<u64, StoreError> {
    match u64::try_from(ttl.as_millis()) {
        Ok(0) | Err(_) => Err(StoreError::InvalidTtl(ttl)),
        Ok(ms) => Ok(ms),
    }
}

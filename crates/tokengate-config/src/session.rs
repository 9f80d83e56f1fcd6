//! Session store configuration.

use std::time::Duration;

use crate::{JwtConfig, env_opt, env_or};

/// Which session store implementation backs the token lifecycle manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    Memory,
}

impl StoreBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "redis" => Some(Self::Redis),
            "memory" | "in-memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Session store settings loaded from environment variables.
///
/// # Environment Variables
///
/// - `SESSION_STORE`: `redis` or `memory` (default: `redis`)
/// - `REDIS_URL`: Redis connection URL (default: `redis://127.0.0.1:6379`)
/// - `SESSION_KEY_PREFIX`: prefix for session keys (default: `tokengate`)
/// - `SESSION_INACTIVITY_SECONDS`: inactivity window in seconds (default: `900`)
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub backend: StoreBackend,
    pub redis_url: String,
    pub key_prefix: String,
    pub inactivity_seconds: u64,
}

impl SessionConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let backend = match env_opt("SESSION_STORE") {
            Some(raw) => StoreBackend::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "Unknown SESSION_STORE, falling back to redis");
                StoreBackend::Redis
            }),
            None => defaults.backend,
        };

        Self {
            backend,
            redis_url: env_opt("REDIS_URL").unwrap_or(defaults.redis_url),
            key_prefix: env_opt("SESSION_KEY_PREFIX").unwrap_or(defaults.key_prefix),
            inactivity_seconds: env_or("SESSION_INACTIVITY_SECONDS", defaults.inactivity_seconds),
        }
    }

    pub fn inactivity_window(&self) -> Duration {
        Duration::from_secs(self.inactivity_seconds)
    }

    /// Returns `false` (and logs a warning) when the inactivity window is not
    /// shorter than the refresh token lifetime.
    pub fn check_against(&self, jwt: &JwtConfig) -> bool {
        let ok = self.inactivity_window() < jwt.refresh_lifetime();
        if !ok {
            tracing::warn!(
                inactivity_secs = self.inactivity_seconds,
                refresh_secs = jwt.refresh_token_expiry,
                "Session inactivity window is not shorter than the refresh token lifetime"
            );
        }
        ok
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Redis,
            redis_url: "redis://127.0.0.1:6379".into(),
            key_prefix: "tokengate".into(),
            inactivity_seconds: 15 * 60,
        }
    }
}

use std::path::PathBuf;
use std::time::Duration;

use crate::{env_opt, env_or};

/// Token signing and lifetime settings.
///
/// # Environment Variables
///
/// - `JWT_ALGORITHM`: signing algorithm name (default: `HS256`)
/// - `JWT_SECRET`: shared secret for the HMAC family
/// - `JWT_PRIVATE_KEY_PATH`: PEM signing key for RSA/EC families
/// - `JWT_PUBLIC_KEY_PATH`: PEM verification key for RSA/EC families
/// - `JWT_ACCESS_EXPIRY`: access token lifetime in seconds (default: `1800`)
/// - `JWT_REFRESH_EXPIRY`: refresh token lifetime in seconds (default: `7200`)
/// - `JWT_CLOCK_SKEW`: accepted expiry skew in seconds (default: `30`)
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub algorithm: String,
    pub secret: Option<String>,
    pub private_key_path: Option<PathBuf>,
    pub public_key_path: Option<PathBuf>,
    pub access_token_expiry: i64,
    pub refresh_token_expiry: i64,
    pub clock_skew: u64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            algorithm: env_opt("JWT_ALGORITHM").unwrap_or(defaults.algorithm),
            secret: env_opt("JWT_SECRET"),
            private_key_path: env_opt("JWT_PRIVATE_KEY_PATH").map(PathBuf::from),
            public_key_path: env_opt("JWT_PUBLIC_KEY_PATH").map(PathBuf::from),
            access_token_expiry: env_or("JWT_ACCESS_EXPIRY", defaults.access_token_expiry),
            refresh_token_expiry: env_or("JWT_REFRESH_EXPIRY", defaults.refresh_token_expiry),
            clock_skew: env_or("JWT_CLOCK_SKEW", defaults.clock_skew),
        }
    }

    pub fn access_lifetime(&self) -> Duration {
        Duration::from_secs(self.access_token_expiry.max(0) as u64)
    }

    pub fn refresh_lifetime(&self) -> Duration {
        Duration::from_secs(self.refresh_token_expiry.max(0) as u64)
    }

    pub fn skew(&self) -> Duration {
        Duration::from_secs(self.clock_skew)
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            algorithm: "HS256".into(),
            secret: None,
            private_key_path: None,
            public_key_path: None,
            access_token_expiry: 30 * 60,
            refresh_token_expiry: 2 * 60 * 60,
            clock_skew: 30,
        }
    }
}

//! # Tokengate Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: signing algorithm, key material locations, token lifetimes and clock skew
//! - [`session`]: session store backend and inactivity window
//! - [`server`]: bind address, request timeout, CORS origins and directory source
//!
//! # Example
//!
//! ```ignore
//! use tokengate_config::{JwtConfig, ServerConfig, SessionConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let session_config = SessionConfig::from_env();
//! session_config.check_against(&jwt_config);
//! ```

pub mod jwt;
pub mod server;
pub mod session;

pub use jwt::JwtConfig;
pub use server::ServerConfig;
pub use session::{SessionConfig, StoreBackend};

/// Reads a numeric environment variable, falling back to `default` when it is
/// unset or does not parse.
pub(crate) fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

pub(crate) fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

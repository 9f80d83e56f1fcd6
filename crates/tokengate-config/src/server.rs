use std::path::PathBuf;
use std::time::Duration;

use crate::{env_opt, env_or};

/// HTTP server settings.
///
/// # Environment Variables
///
/// - `HOST` / `PORT`: bind address (default: `0.0.0.0:3000`)
/// - `REQUEST_TIMEOUT_SECONDS`: per-request timeout (default: `30`)
/// - `CORS_ALLOWED_ORIGINS`: comma separated origins (default: `http://localhost:3000`)
/// - `USER_DIRECTORY_PATH`: JSON file with directory entries (optional)
/// - `METRICS_ENABLED`: expose `/metrics` unless set to `false` or `0`
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
    pub allowed_origins: Vec<String>,
    pub user_directory_path: Option<PathBuf>,
    pub metrics_enabled: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env_opt("HOST").unwrap_or(defaults.host),
            port: env_or("PORT", defaults.port),
            request_timeout_seconds: env_or(
                "REQUEST_TIMEOUT_SECONDS",
                defaults.request_timeout_seconds,
            ),
            allowed_origins: env_opt("CORS_ALLOWED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or(defaults.allowed_origins),
            user_directory_path: env_opt("USER_DIRECTORY_PATH").map(PathBuf::from),
            metrics_enabled: env_opt("METRICS_ENABLED")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.metrics_enabled),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            request_timeout_seconds: 30,
            allowed_origins: vec!["http://localhost:3000".into()],
            user_directory_path: None,
            metrics_enabled: true,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_skips_blanks() {
        let origins = parse_origins("http://a.test, ,http://b.test,");
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_bind_address() {
        let config = ServerConfig {
            host: "127.0.0.1".into(),
            port: 8080,
            ..ServerConfig::default()
        };
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }
}

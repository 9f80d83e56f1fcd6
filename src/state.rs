use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use tokengate_auth::TokenCodec;
use tokengate_cache::{MemorySessionStore, RedisSessionStore, SessionStore};
use tokengate_config::{JwtConfig, ServerConfig, SessionConfig, StoreBackend};
use tracing::{info, warn};

use crate::modules::auth::TokenService;
use crate::modules::auth::tokens::TokenLifetimes;
use crate::modules::users::{InMemoryDirectory, UserDirectory};

#[derive(Clone)]
pub struct AppState {
    pub tokens: TokenService,
    pub directory: Arc<dyn UserDirectory>,
    pub server_config: ServerConfig,
    pub metrics: Option<PrometheusHandle>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.tokens)
            .field("server_config", &self.server_config)
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        tokens: TokenService,
        directory: Arc<dyn UserDirectory>,
        server_config: ServerConfig,
    ) -> Self {
        Self {
            tokens,
            directory,
            server_config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }
}

pub async fn init_session_store(config: &SessionConfig) -> anyhow::Result<Arc<dyn SessionStore>> {
    match config.backend {
        StoreBackend::Redis => {
            let store = RedisSessionStore::new(&config.redis_url).await?;
            info!("Connected to Redis session store");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            warn!("Using in-process session store; sessions are lost on restart");
            Ok(Arc::new(MemorySessionStore::new()))
        }
    }
}

pub fn init_directory(config: &ServerConfig) -> anyhow::Result<Arc<dyn UserDirectory>> {
    let directory = match &config.user_directory_path {
        Some(path) => {
            let directory = InMemoryDirectory::from_json_file(path)?;
            info!(path = %path.display(), users = directory.len(), "Loaded user directory");
            directory
        }
        None => {
            warn!("USER_DIRECTORY_PATH not set; no user can log in");
            InMemoryDirectory::default()
        }
    };
    Ok(Arc::new(directory))
}

/// Builds the shared state from the environment.
pub async fn init_app_state() -> anyhow::Result<AppState> {
    let jwt_config = JwtConfig::from_env();
    let session_config = SessionConfig::from_env();
    let server_config = ServerConfig::from_env();
    session_config.check_against(&jwt_config);

    let codec = TokenCodec::from_config(&jwt_config)?;
    if !codec.can_sign() {
        warn!("No signing key configured; login and refresh will fail");
    }

    let store = init_session_store(&session_config).await?;
    let tokens = TokenService::new(
        Arc::new(codec),
        store,
        session_config.key_prefix.as_str(),
        TokenLifetimes::from_config(&jwt_config, &session_config),
    );

    let directory = init_directory(&server_config)?;

    Ok(AppState::new(tokens, directory, server_config))
}

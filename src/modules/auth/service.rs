use tokengate_core::{AppError, verify_password};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::metrics;
use crate::modules::users::UserDirectory;

use super::model::{LoginRequest, LoginResponse, RefreshRequest};
use super::tokens::{Subject, TokenKind, TokenService};

pub const MSG_INVALID_CREDENTIALS: &str = "invalid credentials provided";

pub struct AuthService;

impl AuthService {
    /// Authenticates `dto` against the directory and issues a fresh pair,
    /// replacing any session the subject already had.
    ///
    /// Unknown identities and wrong passwords are indistinguishable to the
    /// caller.
    #[instrument(skip(directory, tokens, dto), fields(email = %dto.email))]
    pub async fn login(
        directory: &dyn UserDirectory,
        tokens: &TokenService,
        dto: LoginRequest,
    ) -> Result<LoginResponse, AppError> {
        let user = directory
            .find_by_identity(&dto.email)
            .await
            .map_err(AppError::internal)?;

        let Some(user) = user else {
            metrics::track_login_failure("unknown_identity");
            warn!("Login attempt for unknown identity");
            return Err(AppError::unauthorized(MSG_INVALID_CREDENTIALS));
        };

        if !verify_password(&dto.password, &user.password_hash) {
            metrics::track_login_failure("bad_password");
            warn!(user.id = %user.id, "Login attempt with wrong password");
            return Err(AppError::unauthorized(MSG_INVALID_CREDENTIALS));
        }

        let pair = tokens
            .issue_pair(&Subject {
                id: user.id,
                username: user.email,
            })
            .await?;

        metrics::track_login_success();
        info!(user.id = %user.id, "User logged in");
        Ok(pair.into())
    }

    /// Exchanges a live refresh token for a new pair. The old pair stops
    /// being live as soon as the new record is written.
    #[instrument(skip_all)]
    pub async fn refresh(
        tokens: &TokenService,
        dto: RefreshRequest,
    ) -> Result<LoginResponse, AppError> {
        let result = async {
            let (claims, identity) = tokens.parse_and_identify(&dto.token)?;
            tokens.validate_liveness(&claims, TokenKind::Refresh).await?;
            tokens.issue_pair(&Subject::from(&identity)).await
        }
        .await;

        metrics::track_refresh(result.is_ok());
        let pair = result.inspect_err(|e| metrics::track_rejection(e.kind()))?;
        Ok(pair.into())
    }

    #[instrument(skip(tokens))]
    pub async fn logout(tokens: &TokenService, subject_id: Uuid) -> Result<(), AppError> {
        tokens.revoke(subject_id).await?;
        info!("User logged out");
        Ok(())
    }
}

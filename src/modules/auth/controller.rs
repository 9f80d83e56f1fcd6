use axum::Json;
use axum::extract::State;
use tracing::instrument;
use utoipa::ToSchema;

use crate::middleware::auth::{AuthUser, TokenOutcome};
use crate::state::AppState;
use crate::validator::ValidatedJson;
use tokengate_auth::Identity;
use tokengate_core::AppError;

use super::model::{LoginRequest, LoginResponse, MessageResponse, RefreshRequest, SessionStatus};
use super::service::AuthService;

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Log in and receive an access/refresh token pair
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn login_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::login(state.directory.as_ref(), &state.tokens, dto).await?;
    Ok(Json(response))
}

/// Exchange a live refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair issued", body = LoginResponse),
        (status = 401, description = "Refresh token invalid, expired or superseded", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RefreshRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::refresh(&state.tokens, dto).await?;
    Ok(Json(response))
}

/// End the caller's session
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session revoked", body = MessageResponse),
        (status = 401, description = "Missing, invalid or inactive token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Authentication"
)]
#[instrument(skip_all, fields(user.id = %auth_user.0.id))]
pub async fn logout_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::logout(&state.tokens, auth_user.0.id).await?;
    Ok(Json(MessageResponse {
        message: "User logged out".to_string(),
    }))
}

/// Report whether the request carries a verifiable token
#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Token status", body = SessionStatus)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn session_status(outcome: TokenOutcome) -> Json<SessionStatus> {
    let status = match outcome {
        TokenOutcome::Verified { claims, .. } => match Identity::try_from(&claims) {
            Ok(identity) => SessionStatus {
                authenticated: true,
                username: Some(identity.username),
                expires_at: identity.expires_at.map(|t| t.timestamp()),
                error: None,
            },
            Err(e) => rejected(e.public_message()),
        },
        TokenOutcome::Rejected { error, .. } => rejected(error.public_message()),
        TokenOutcome::Missing => SessionStatus {
            authenticated: false,
            username: None,
            expires_at: None,
            error: None,
        },
    };
    Json(status)
}

fn rejected(message: &str) -> SessionStatus {
    SessionStatus {
        authenticated: false,
        username: None,
        expires_at: None,
        error: Some(message.to_string()),
    }
}

use axum::{Json, extract::State};
use tracing::{instrument, warn};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::users::model::ProfileResponse;
use crate::state::AppState;
use tokengate_core::AppError;

/// Get the identity bound to the caller's session
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Authenticated identity", body = ProfileResponse),
        (status = 401, description = "Missing, invalid or inactive token", body = ErrorResponse),
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(skip_all, fields(user.id = %auth_user.0.id))]
pub async fn get_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let identity = auth_user.0;

    // Entries that are gone or reassigned leave `name` unset.
    let name = match state.directory.find_by_identity(&identity.username).await {
        Ok(user) => user.filter(|u| u.id == identity.id).map(|u| u.name),
        Err(e) => {
            warn!(error = %e, "Directory lookup failed");
            None
        }
    };

    Ok(Json(ProfileResponse {
        id: identity.id,
        username: identity.username,
        name,
        expires_at: identity.expires_at.map(|t| t.timestamp()),
    }))
}

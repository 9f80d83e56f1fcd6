use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::controller::{login_user, logout_user, refresh_token, session_status};
use crate::middleware::auth::require_session;
use crate::state::AppState;

pub fn init_auth_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/logout", post(logout_user))
        .route_layer(middleware::from_fn_with_state(state, require_session));

    Router::new()
        .route("/login", post(login_user))
        .route("/refresh", post(refresh_token))
        .route("/session", get(session_status))
        .merge(protected)
}

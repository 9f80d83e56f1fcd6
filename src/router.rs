use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::{metrics_middleware, render_metrics};
use crate::middleware::auth::{require_session, verify_token};
use crate::modules::auth::router::init_auth_router;
use crate::modules::users::router::init_users_router;
use crate::state::AppState;
use axum::http::{HeaderValue, Method, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router, middleware};
use serde_json::{Value, json};
use std::any::Any;
use tokengate_core::AppError;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use utoipa::OpenApi;

pub fn init_router(state: AppState) -> Router {
    let api = Router::new()
        .nest(
            "/users",
            init_users_router().route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_session,
            )),
        )
        .nest("/auth", init_auth_router(state.clone()))
        .layer(middleware::from_fn_with_state(state.clone(), verify_token));

    let router = Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_document))
        .route("/metrics", get(render_metrics))
        .nest("/api", api)
        .with_state(state.clone())
        .layer(TimeoutLayer::new(state.server_config.request_timeout()))
        .layer(cors_layer(&state));

    request_layers(router)
}

/// Outer layers shared by every route, listed innermost first.
///
/// The request id is assigned before the logging span opens and echoed on
/// the response. Panics become a 500 inside the span so they are logged and
/// counted.
fn request_layers(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());

    AppError::internal(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .server_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn openapi_document() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

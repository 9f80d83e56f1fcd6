use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::{Duration, Instant};

use crate::state::AppState;

/// Install the Prometheus recorder and spawn its upkeep task.
///
/// Returns `Ok(None)` when metrics are disabled. Without an installed recorder
/// every `track_*` helper below is a no-op.
pub fn init_metrics(enabled: bool) -> anyhow::Result<Option<PrometheusHandle>> {
    if !enabled {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[
                0.001, 0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0,
            ],
        )?
        .install_recorder()?;

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Ok(Some(handle))
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    gauge!("http_requests_active").increment(1.0);

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status).increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path).record(latency);
    gauge!("http_requests_active").decrement(1.0);

    response
}

/// `GET /metrics`
pub async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

// Session authority metrics

pub fn track_login_success() {
    counter!("auth_logins_total", "status" => "success").increment(1);
}

pub fn track_login_failure(reason: &'static str) {
    counter!("auth_logins_total", "status" => "failure", "reason" => reason).increment(1);
}

pub fn track_tokens_issued() {
    counter!("auth_token_pairs_issued_total").increment(1);
}

pub fn track_refresh(success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!("auth_refreshes_total", "status" => status).increment(1);
}

pub fn track_session_revoked() {
    counter!("auth_sessions_revoked_total").increment(1);
}

/// Count a rejected request by [`tokengate_auth::AuthError::kind`].
pub fn track_rejection(kind: &'static str) {
    counter!("auth_rejections_total", "kind" => kind).increment(1);
}

pub fn track_prolong_failure() {
    counter!("auth_session_prolong_failures_total").increment(1);
}

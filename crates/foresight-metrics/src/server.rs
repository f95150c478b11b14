//! The metrics scrape endpoint.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;

use crate::registry::LoopMetrics;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the router serving `GET /metrics`.
///
/// Runs on its own listener task and only reads published atomics, so
/// a scrape can never block an in-flight cycle.
pub fn metrics_router(metrics: Arc<LoopMetrics>) -> Router {
    Router::new()
        .route("/metrics", get(serve_metrics))
        .with_state(metrics)
}

async fn serve_metrics(State(metrics): State<Arc<LoopMetrics>>) -> impl IntoResponse {
    let body = crate::prometheus::render_prometheus(&metrics.snapshot(), VERSION);
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}

//! Health check endpoints for monitoring and orchestration.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Overall service health.
///
/// The service holds no external connections, so health reduces to the
/// process being up and serving.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "fanout",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness probe: whether the service can accept traffic.
pub async fn readiness_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ready" })))
}

/// Liveness probe: whether the process should be restarted.
pub async fn liveness_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "alive" })))
}

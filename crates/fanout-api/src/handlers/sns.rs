//! Webhook ingestion handler.
//!
//! Parses the inbound body as a provider notification and hands it to
//! the dispatcher. Parse and verification failures are client errors;
//! handling failures map to a generic server error with the details
//! kept in the logs.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use fanout_sns::{DispatchError, SnsNotification, MESSAGE_TYPE_HEADER};
use serde::Serialize;
use serde_json::json;
use tracing::{instrument, warn};

use crate::server::AppState;

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// Human-readable failure reason
    error: String,
}

/// Ingests one provider notification.
///
/// Responds `200 {}` on success, `400` with a reason for malformed
/// bodies and signature failures, and `500` for handling failures.
#[instrument(
    name = "receive_sns",
    skip(state, headers, body),
    fields(
        message_type = headers
            .get(MESSAGE_TYPE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("missing"),
    )
)]
pub async fn receive_sns(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let notification: SnsNotification = match serde_json::from_slice(&body) {
        Ok(notification) => notification,
        Err(error) => {
            warn!(error = %error, "rejecting unparseable notification body");
            return error_response(StatusCode::BAD_REQUEST, &error.to_string());
        },
    };

    let message_type = headers
        .get(MESSAGE_TYPE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    match state.dispatcher.process(message_type, &notification).await {
        Ok(()) => (StatusCode::OK, Json(json!({}))).into_response(),
        Err(DispatchError::Verify(error)) => {
            warn!(
                notification_type = %notification.kind,
                error = %error,
                "rejecting notification with unverifiable signature"
            );
            error_response(StatusCode::BAD_REQUEST, "signature mismatch")
        },
        Err(error) => {
            tracing::error!(
                notification_type = %notification.kind,
                error = %error,
                "failed to handle notification"
            );
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to handle event")
        },
    }
}

fn error_response(status: StatusCode, reason: &str) -> Response {
    (status, Json(ErrorBody { error: reason.to_string() })).into_response()
}

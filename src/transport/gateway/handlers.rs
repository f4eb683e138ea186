use super::{ActionBody, AppState, WEBHOOK_SECRET_HEADER};
use crate::reminders::ActionEvent;
use axum::{
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};

/// Constant-time equality comparison for secret strings.
fn constant_time_eq(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn secret_matches(state: &AppState, headers: &HeaderMap) -> bool {
    let Some(secret) = state.webhook_secret.as_deref() else {
        return true;
    };
    headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|val| constant_time_eq(val, secret))
}

fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(serde_json::json!({ "error": message })))
}

/// GET /health
pub(super) async fn handle_health() -> impl IntoResponse {
    Json(crate::diagnostics::health::snapshot_json())
}

/// POST /actions
pub(super) async fn handle_action(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ActionBody>, JsonRejection>,
) -> impl IntoResponse {
    if !secret_matches(&state, &headers) {
        tracing::warn!("action event rejected: missing or invalid webhook secret");
        return error_response(StatusCode::UNAUTHORIZED, "Invalid webhook secret");
    }

    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::debug!("malformed action event: {rejection}");
            return error_response(rejection.status(), &rejection.body_text());
        }
    };
    if body.action.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Missing action");
    }

    let event = ActionEvent::new(body.action, body.reply_text);
    if state.actions.send(event).await.is_err() {
        tracing::warn!("action event dropped: notification manager is not running");
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "Notification engine stopped");
    }

    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "status": "queued" })),
    )
}

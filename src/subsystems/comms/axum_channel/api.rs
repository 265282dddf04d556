//! Axum handlers for `/api/*` routes.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::AxumState;
use crate::router::Selector;
use crate::subsystems::comms::EMPTY_MESSAGE_NOTICE;

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct ChatBody {
    #[serde(default)]
    message: String,
    /// Picker label; the configured default when absent.
    model: Option<String>,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn json_error(code: &str, msg: impl std::fmt::Display) -> Json<serde_json::Value> {
    Json(json!({ "error": code, "message": format!("{msg}") }))
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /api/health
pub(super) async fn health(State(state): State<AxumState>) -> Response {
    let body = json!({
        "status": "ok",
        "assistant": &*state.assistant_name,
        "remote_available": state.comms.remote_available(),
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// GET /api/models — picker labels in display order.
pub(super) async fn models(State(state): State<AxumState>) -> Response {
    let models: Vec<_> = Selector::ALL
        .iter()
        .map(|s| {
            let available = match s {
                Selector::Local => true,
                Selector::Remote => state.comms.remote_available(),
            };
            json!({ "label": s.label(), "available": available })
        })
        .collect();
    let body = json!({
        "models": models,
        "default": state.comms.default_selector().label(),
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// POST /api/chat
///
/// Routing failures are normal `200` replies with `is_error: true`; only an
/// empty message or a timeout produce an HTTP error status.
pub(super) async fn chat(State(state): State<AxumState>, Json(req): Json<ChatBody>) -> Response {
    // Only a missing or zero-length message is rejected; blank text is routed.
    if req.message.is_empty() {
        return (StatusCode::BAD_REQUEST, json_error("empty_message", EMPTY_MESSAGE_NOTICE)).into_response();
    }

    let model = req
        .model
        .unwrap_or_else(|| state.comms.default_selector().label().to_string());
    debug!(channel_id = %state.channel_id, %model, "chat request");

    match tokio::time::timeout(
        state.chat_timeout,
        state.comms.send_message(&state.channel_id, &req.message, Some(&model)),
    )
    .await
    {
        Ok(reply) => {
            let body = json!({
                "reply": reply.text,
                "is_error": reply.is_error,
                "model": model,
            });
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(_) => {
            warn!(
                channel_id = %state.channel_id,
                %model,
                timeout_secs = state.chat_timeout.as_secs(),
                "chat request timed out"
            );
            (StatusCode::GATEWAY_TIMEOUT, json_error("timeout", "model request timed out")).into_response()
        }
    }
}

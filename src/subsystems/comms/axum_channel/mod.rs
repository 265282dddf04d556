//! Axum-based HTTP channel — the chat page plus a small JSON API.
//!
//! Implements [`Channel`] so it slots into the comms lifecycle: `run()`
//! drives the axum event loop and the [`CancellationToken`] is wired to
//! axum's graceful shutdown.
//!
//! ## URL layout
//!
//! ```text
//! GET  /               → chat page
//! GET  /favicon.ico    → 204
//! GET  /api/health
//! GET  /api/models
//! POST /api/chat
//! ```

mod api;
mod ui;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::state::CommsState;
use crate::error::AppError;
use crate::subsystems::runtime::{Channel, ChannelFuture};

// ── Shared request state ──────────────────────────────────────────────────────

/// Router state injected into every handler. Cheap to clone.
#[derive(Clone)]
pub struct AxumState {
    pub channel_id: Arc<str>,
    pub assistant_name: Arc<str>,
    pub comms: Arc<CommsState>,
    /// Bound on one `/api/chat` round-trip.
    pub chat_timeout: Duration,
}

// ── AxumChannel ───────────────────────────────────────────────────────────────

pub struct AxumChannel {
    channel_id: String,
    bind_addr: String,
    assistant_name: String,
    chat_timeout: Duration,
    state: Arc<CommsState>,
}

impl AxumChannel {
    pub fn new(
        channel_id: impl Into<String>,
        bind_addr: impl Into<String>,
        assistant_name: impl Into<String>,
        chat_timeout: Duration,
        state: Arc<CommsState>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            bind_addr: bind_addr.into(),
            assistant_name: assistant_name.into(),
            chat_timeout,
            state,
        }
    }
}

impl Channel for AxumChannel {
    fn id(&self) -> &str {
        &self.channel_id
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ChannelFuture {
        let axum_state = AxumState {
            channel_id: Arc::from(self.channel_id.as_str()),
            assistant_name: Arc::from(self.assistant_name.as_str()),
            comms: self.state,
            chat_timeout: self.chat_timeout,
        };
        Box::pin(run_axum(self.bind_addr, axum_state, shutdown))
    }
}

// ── Server loop ───────────────────────────────────────────────────────────────

async fn run_axum(bind_addr: String, state: AxumState, shutdown: CancellationToken) -> Result<(), AppError> {
    let channel_id = state.channel_id.clone();
    let router = build_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| AppError::Comms(format!("axum bind failed on {bind_addr}: {e}")))?;

    info!(%channel_id, %bind_addr, "http channel listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Comms(format!("axum server error: {e}")))?;

    info!(%channel_id, "http channel shut down");
    Ok(())
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn build_router(state: AxumState) -> Router {
    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/models", get(api::models))
        .route("/api/chat",   post(api::chat))
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .route("/",            get(ui::root))
        .with_state(state)
}

//! Shared state for the comms subsystem — capability boundary for channels.
//!
//! Channels receive an `Arc<CommsState>` and only see the typed methods below.
//! The router itself stays private.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::router::{ChatResponse, ResponseRouter, Selector};

/// Notice shown when the user submits nothing.
pub const EMPTY_MESSAGE_NOTICE: &str = "⚠️ Please enter a message to get a response.";

// ── Events ────────────────────────────────────────────────────────────────────

/// Events a channel sends back to the comms manager.
#[derive(Debug)]
pub enum CommsEvent {
    /// Channel has stopped (clean exit or EOF).
    ChannelShutdown { channel_id: String },
    /// The channel is accepting input.
    SessionStarted { channel_id: String },
}

// ── State ─────────────────────────────────────────────────────────────────────

pub struct CommsState {
    router: Arc<ResponseRouter>,
    default_selector: Selector,
    event_tx: mpsc::Sender<CommsEvent>,
}

impl CommsState {
    pub fn new(
        router: Arc<ResponseRouter>,
        default_selector: Selector,
        event_tx: mpsc::Sender<CommsEvent>,
    ) -> Self {
        Self { router, default_selector, event_tx }
    }

    pub fn default_selector(&self) -> Selector {
        self.default_selector
    }

    pub fn remote_available(&self) -> bool {
        self.router.remote_available()
    }

    /// Route `content` from `channel_id` using the picker label `model`
    /// (falling back to the default selector) and return the reply.
    pub async fn send_message(&self, channel_id: &str, content: &str, model: Option<&str>) -> ChatResponse {
        let label = model.unwrap_or(self.default_selector.label());
        let response = self.router.route(content, label).await;
        info!(
            %channel_id,
            model = label,
            is_error = response.is_error,
            reply_len = response.text.len(),
            "reply produced"
        );
        response
    }

    /// Non-blocking: drops the event with a warning if the manager is
    /// behind or gone.
    pub fn report_event(&self, event: CommsEvent) {
        if let Err(e) = self.event_tx.try_send(event) {
            warn!("comms event dropped: {e}");
        }
    }
}

#[cfg(test)]
impl CommsState {
    /// Dummy local backend, no remote, events discarded.
    pub fn test_default() -> Arc<Self> {
        use crate::llm::{LlmProvider, providers::dummy::DummyProvider};

        let (event_tx, _event_rx) = mpsc::channel(8);
        let router = ResponseRouter::new(LlmProvider::Dummy(DummyProvider), None);
        Arc::new(Self::new(Arc::new(router), Selector::Local, event_tx))
    }
}

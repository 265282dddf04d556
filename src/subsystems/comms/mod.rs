//! Comms subsystem — the presentation layer.
//!
//! Each channel (PTY, HTTP) implements [`Channel`] and is spawned as an
//! independent task by [`start`]. Channels capture their shared
//! [`Arc<CommsState>`] at construction time.
//!
//! An intra-subsystem [`mpsc`] channel lets running channels report lifecycle
//! events; it is drained by a short-lived background task that ends when all
//! channel senders are dropped.

mod state;
#[cfg(feature = "channel-axum")]
pub mod axum_channel;
#[cfg(feature = "channel-pty")]
pub mod pty;

pub use state::{CommsEvent, CommsState, EMPTY_MESSAGE_NOTICE};

use std::sync::Arc;
#[cfg(feature = "channel-axum")]
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::router::{ResponseRouter, Selector};
use crate::subsystems::runtime::{Channel, ChannelsHandle, spawn_channels};

/// Spawn all configured channels and return a [`ChannelsHandle`].
///
/// Synchronous: returns as soon as the tasks are spawned. If any channel
/// fails, `shutdown` is cancelled so the others stop too.
pub fn start(config: &Config, router: Arc<ResponseRouter>, shutdown: CancellationToken) -> ChannelsHandle {
    let default_selector = Selector::from_label(&config.comms.default_model).unwrap_or_else(|| {
        warn!(label = %config.comms.default_model, "unknown default_model — falling back to DistilGPT-2");
        Selector::Local
    });

    let (event_tx, event_rx) = mpsc::channel::<CommsEvent>(32);
    let state = Arc::new(CommsState::new(router, default_selector, event_tx));

    let mut channels: Vec<Box<dyn Channel>> = Vec::new();

    #[cfg(feature = "channel-pty")]
    {
        if config.comms_pty_should_load() {
            info!("loading pty channel");
            channels.push(Box::new(pty::PtyChannel::new("pty0", state.clone())));
        }
    }

    #[cfg(feature = "channel-axum")]
    {
        if config.comms_http_should_load() {
            info!(bind = %config.comms.http.bind, "loading http channel");
            channels.push(Box::new(axum_channel::AxumChannel::new(
                "http0",
                config.comms.http.bind.clone(),
                config.assistant_name.clone(),
                Duration::from_secs(config.comms.http.chat_timeout_seconds),
                state.clone(),
            )));
        }
    }

    if channels.is_empty() {
        warn!("no comms channels configured — nothing to serve");
    }

    // Channels hold their own `Arc`; the drain below ends when the last one exits.
    drop(state);

    tokio::spawn(async move {
        let mut rx = event_rx;
        while let Some(event) = rx.recv().await {
            match event {
                CommsEvent::ChannelShutdown { ref channel_id } => {
                    debug!(channel_id, "channel reported shutdown");
                }
                CommsEvent::SessionStarted { ref channel_id } => {
                    debug!(channel_id, "channel session started");
                }
            }
        }
    });

    spawn_channels(channels, shutdown)
}

//! Channel runtime: runs the console and HTTP channels side by side.
//!
//! Each [`Channel`] is built with its [`CommsState`](super::comms::CommsState)
//! already captured, then handed to [`spawn_channels`]. Every channel gets its
//! own task; the first one to fail or panic cancels the shared
//! [`CancellationToken`] so the rest wind down, and [`ChannelsHandle::join`]
//! reports that failure tagged with the channel id.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::AppError;

/// Future returned by [`Channel::run`].
pub type ChannelFuture = Pin<Box<dyn Future<Output = Result<(), AppError>> + Send + 'static>>;

/// A user-facing entry point (console, HTTP).
///
/// `run` is called once and should return when `shutdown` is cancelled or the
/// channel's input is exhausted (stdin closed).
pub trait Channel: Send + 'static {
    /// Id used in logs and in failures reported by [`ChannelsHandle::join`].
    fn id(&self) -> &str;

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ChannelFuture;
}

/// Join handle over every spawned channel.
pub struct ChannelsHandle {
    inner: JoinHandle<Result<(), AppError>>,
}

impl ChannelsHandle {
    /// Wait for all channels; yields the first failure, if any.
    pub async fn join(self) -> Result<(), AppError> {
        match self.inner.await {
            Ok(r) => r,
            Err(e) => Err(AppError::Comms(format!("channel supervisor panicked: {e}"))),
        }
    }
}

/// Spawn one task per channel and supervise them.
pub fn spawn_channels(channels: Vec<Box<dyn Channel>>, shutdown: CancellationToken) -> ChannelsHandle {
    let handle = tokio::spawn(async move {
        let mut set: JoinSet<Result<(), AppError>> = JoinSet::new();
        let mut ids = HashMap::with_capacity(channels.len());

        for channel in channels {
            let channel_id = channel.id().to_string();
            debug!(%channel_id, "spawning channel");
            let task = set.spawn(channel.run(shutdown.clone()));
            ids.insert(task.id(), channel_id);
        }

        let mut first_err: Option<AppError> = None;

        while let Some(res) = set.join_next_with_id().await {
            match res {
                Ok((task_id, Ok(()))) => {
                    let channel_id = ids.remove(&task_id).unwrap_or_default();
                    info!(%channel_id, "channel stopped");
                }
                Ok((task_id, Err(e))) => {
                    let channel_id = ids.remove(&task_id).unwrap_or_default();
                    error!(%channel_id, error = %e, "channel failed, stopping the others");
                    shutdown.cancel();
                    first_err.get_or_insert(AppError::Channel { id: channel_id, source: Box::new(e) });
                }
                Err(e) => {
                    let channel_id = ids.remove(&e.id()).unwrap_or_default();
                    error!(%channel_id, error = %e, "channel panicked, stopping the others");
                    shutdown.cancel();
                    first_err.get_or_insert_with(|| AppError::Comms(format!("channel {channel_id} panicked: {e}")));
                }
            }
        }

        first_err.map_or(Ok(()), Err)
    });

    ChannelsHandle { inner: handle }
}

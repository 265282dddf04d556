//! Application-wide error types.
//!
//! Only startup and channel transport failures surface as [`AppError`].
//! Routing failures never do: the router turns them into a reply string.

use thiserror::Error;

use crate::llm::ProviderError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("comms error: {0}")]
    Comms(String),

    /// A channel task returned an error; `id` names the channel.
    #[error("channel {id}: {source}")]
    Channel { id: String, source: Box<AppError> },

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

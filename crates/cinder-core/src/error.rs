//! Core error types.

use thiserror::Error;

/// Errors surfaced by a [`Responder`](crate::boundary::Responder)
/// implementation when delivering a message fails.
#[derive(Debug, Clone, Error)]
pub enum RespondError {
    /// The platform connection is not available.
    #[error("not connected to the platform")]
    NotConnected,

    /// The target channel does not exist or is not visible.
    #[error("unknown channel: {0}")]
    UnknownChannel(crate::message::ChannelId),

    /// The platform rejected the send.
    #[error("platform rejected send: {0}")]
    Rejected(String),
}

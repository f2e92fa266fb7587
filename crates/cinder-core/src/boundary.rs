//! Boundary contracts consumed and exposed by the dispatch core.
//!
//! The core performs no network I/O and holds no platform state of its own.
//! Everything it needs to know about the outside world arrives through the
//! three collaborator traits in this module:
//!
//! - [`ChannelScope`] — channel categorisation, used to drop events from
//!   excluded channels and to confine commands to designated channels.
//! - [`PermissionLookup`] — the author's effective permissions in a channel.
//! - [`Responder`] — the message-send capability used to surface
//!   user-visible dispatch outcomes.
//!
//! Implementations live in the platform adapter; the core only ever sees
//! `Arc<dyn …>` references.

use async_trait::async_trait;

use crate::error::RespondError;
use crate::message::{ChannelId, GuildId, PermissionSet, UserId};

/// Channel categorisation predicate.
///
/// Guild operators assign free-form category tags to channels (for example
/// `"noread"` for channels the bot must ignore, or `"commands"` for channels
/// where commands are accepted). The core queries membership and never
/// interprets the tags beyond the two it is configured with.
pub trait ChannelScope: Send + Sync {
    /// Returns `true` if `channel` carries the tag `category` in `guild`.
    ///
    /// `guild` is `None` for direct messages; implementations typically
    /// return `false` in that case since direct channels are uncategorised.
    fn is_in_category(&self, guild: Option<GuildId>, category: &str, channel: ChannelId) -> bool;
}

/// Effective-permission lookup.
pub trait PermissionLookup: Send + Sync {
    /// Computes the effective permission set of `user` in `channel`,
    /// including role grants and channel overrides.
    fn effective_permissions(&self, user: UserId, channel: ChannelId) -> PermissionSet;
}

/// Message-send capability used for user-visible dispatch outcomes.
///
/// The dispatcher formats the outcome text itself; the responder only
/// delivers it. Failures are the responder's to report — the dispatcher
/// logs them and moves on.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Sends `text` to `channel`.
    async fn send(&self, channel: ChannelId, text: &str) -> Result<(), RespondError>;
}

//! Message payloads and identifier types.
//!
//! Platform snowflakes are wrapped in newtypes so that a channel id can never
//! be passed where a user id is expected. [`ChatMessage`] is the
//! platform-neutral payload of a message-shaped event; adapters translate
//! their native message objects into it before handing events to the router.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Identifier newtypes
// ============================================================================

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

id_newtype! {
    /// Unique identifier of a user account.
    UserId
}

id_newtype! {
    /// Unique identifier of a channel.
    ChannelId
}

id_newtype! {
    /// Unique identifier of a guild (server).
    GuildId
}

// ============================================================================
// Permissions
// ============================================================================

/// A named permission, e.g. `manage_guild` or `kick_members`.
///
/// Cinder does not interpret permission names; it only compares them for
/// set containment when gating command dispatch. The set of meaningful names
/// is defined by the platform adapter supplying the
/// [`PermissionLookup`](crate::boundary::PermissionLookup) collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(String);

impl Permission {
    /// Creates a permission from its platform name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the platform name of this permission.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Permission {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The effective permission set of a user in a channel.
pub type PermissionSet = HashSet<Permission>;

// ============================================================================
// Author
// ============================================================================

/// The resolved author of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// The author's account id.
    pub id: UserId,
    /// The author's account name.
    pub name: String,
    /// The author's display name in the originating guild (nickname if set,
    /// account name otherwise).
    pub display_name: String,
}

impl Author {
    /// Creates an author whose display name equals the account name.
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            display_name: name.clone(),
            name,
        }
    }

    /// Sets a guild-specific display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }
}

// ============================================================================
// ChatMessage
// ============================================================================

/// The platform-neutral payload of a message-shaped event.
///
/// A `ChatMessage` is what the command dispatcher inspects: the raw text,
/// who wrote it, and where. Direct messages carry no guild id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Raw message text as received from the platform.
    pub content: String,
    /// Resolved author identity.
    pub author: Author,
    /// Channel the message was posted in.
    pub channel: ChannelId,
    /// Guild the channel belongs to; `None` for direct messages.
    pub guild: Option<GuildId>,
}

impl ChatMessage {
    /// Creates a guild message.
    pub fn new(
        content: impl Into<String>,
        author: Author,
        channel: ChannelId,
        guild: GuildId,
    ) -> Self {
        Self {
            content: content.into(),
            author,
            channel,
            guild: Some(guild),
        }
    }

    /// Creates a direct message (no guild).
    pub fn direct(content: impl Into<String>, author: Author, channel: ChannelId) -> Self {
        Self {
            content: content.into(),
            author,
            channel,
            guild: None,
        }
    }
}

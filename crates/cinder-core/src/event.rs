//! Event model for the Cinder framework.
//!
//! Every inbound platform occurrence — a message, an edit, a reaction, a
//! membership change — is represented as a value implementing [`Event`].
//! Events are type-erased into [`BoxedEvent`] for routing and can be
//! downcast back to their concrete type by handlers that need the native
//! payload.
//!
//! The core ships the message-shaped event types the dispatcher must
//! understand; adapters define the rest of their platform's event vocabulary
//! by implementing [`Event`] on their own types.

use std::any::Any;
use std::sync::Arc;

use crate::message::{Author, ChannelId, ChatMessage, GuildId, UserId};

// ============================================================================
// Core Event trait
// ============================================================================

/// The base trait for all events routed through Cinder.
///
/// Events are type-erased using `dyn Event` and can be downcast to concrete
/// types via `as_any()`. The router only relies on the event name, the
/// optional target channel (for scope filtering), and the optional message
/// payload (for command dispatch).
pub trait Event: Any + Send + Sync {
    /// Returns the name of this event, e.g. `"message"` or `"member_join"`.
    ///
    /// Plugins subscribe to events by this name.
    fn event_name(&self) -> &'static str;

    /// Returns the guild this event originated in, if any.
    fn guild_id(&self) -> Option<GuildId> {
        None
    }

    /// Returns the channel this event targets, if any.
    ///
    /// Events without a target channel (membership changes, guild updates)
    /// bypass the router's channel-scope filter.
    fn channel_id(&self) -> Option<ChannelId> {
        None
    }

    /// Returns the chat message carried by this event, if it is
    /// message-shaped. Only such events are considered for command dispatch.
    fn as_message(&self) -> Option<&ChatMessage> {
        None
    }

    /// Returns a reference to self as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

// ============================================================================
// BoxedEvent
// ============================================================================

/// A type-erased, cheaply cloneable event container.
///
/// `BoxedEvent` wraps any [`Event`] in an `Arc`, allowing the router to hand
/// the same event to many concurrently running handlers without copying the
/// payload.
///
/// `BoxedEvent` derefs to `dyn Event`, so trait methods can be called
/// directly:
///
/// ```rust,ignore
/// let event: BoxedEvent = BoxedEvent::new(MessageEvent::new(msg));
/// assert_eq!(event.event_name(), "message");
/// ```
#[derive(Clone)]
pub struct BoxedEvent {
    inner: Arc<dyn Event>,
}

impl BoxedEvent {
    /// Creates a new `BoxedEvent` from any type implementing [`Event`].
    pub fn new<E: Event + 'static>(event: E) -> Self {
        Self {
            inner: Arc::new(event),
        }
    }

    /// Returns the inner `Arc<dyn Event>`.
    pub fn inner(&self) -> &Arc<dyn Event> {
        &self.inner
    }

    /// Attempts to downcast to a concrete event type.
    pub fn downcast_ref<E: Event + 'static>(&self) -> Option<&E> {
        self.inner.as_any().downcast_ref()
    }
}

impl std::ops::Deref for BoxedEvent {
    type Target = dyn Event;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl std::fmt::Debug for BoxedEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxedEvent")
            .field("event_name", &self.event_name())
            .field("channel", &self.channel_id())
            .finish()
    }
}

// ============================================================================
// Built-in message-shaped events
// ============================================================================

/// A chat message was posted.
#[derive(Debug, Clone)]
pub struct MessageEvent {
    message: ChatMessage,
}

impl MessageEvent {
    /// Wraps a message payload as an event.
    pub fn new(message: ChatMessage) -> Self {
        Self { message }
    }

    /// Returns the message payload.
    pub fn message(&self) -> &ChatMessage {
        &self.message
    }
}

impl Event for MessageEvent {
    fn event_name(&self) -> &'static str {
        "message"
    }

    fn guild_id(&self) -> Option<GuildId> {
        self.message.guild
    }

    fn channel_id(&self) -> Option<ChannelId> {
        Some(self.message.channel)
    }

    fn as_message(&self) -> Option<&ChatMessage> {
        Some(&self.message)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A chat message was edited.
///
/// Carries both revisions; the *after* revision is the message payload, so
/// an edit is still message-shaped for subscribers that only care about
/// current content. Edits are not re-run through command dispatch.
#[derive(Debug, Clone)]
pub struct MessageEditEvent {
    before: ChatMessage,
    after: ChatMessage,
}

impl MessageEditEvent {
    /// Wraps the two revisions of an edited message.
    pub fn new(before: ChatMessage, after: ChatMessage) -> Self {
        Self { before, after }
    }

    /// Returns the message as it was before the edit.
    pub fn before(&self) -> &ChatMessage {
        &self.before
    }

    /// Returns the message as it is after the edit.
    pub fn after(&self) -> &ChatMessage {
        &self.after
    }
}

impl Event for MessageEditEvent {
    fn event_name(&self) -> &'static str {
        "message_edit"
    }

    fn guild_id(&self) -> Option<GuildId> {
        self.after.guild
    }

    fn channel_id(&self) -> Option<ChannelId> {
        Some(self.after.channel)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A chat message was deleted.
#[derive(Debug, Clone)]
pub struct MessageDeleteEvent {
    message: ChatMessage,
}

impl MessageDeleteEvent {
    /// Wraps the deleted message payload.
    pub fn new(message: ChatMessage) -> Self {
        Self { message }
    }

    /// Returns the deleted message.
    pub fn message(&self) -> &ChatMessage {
        &self.message
    }
}

impl Event for MessageDeleteEvent {
    fn event_name(&self) -> &'static str {
        "message_delete"
    }

    fn guild_id(&self) -> Option<GuildId> {
        self.message.guild
    }

    fn channel_id(&self) -> Option<ChannelId> {
        Some(self.message.channel)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A reaction was added to or removed from a message.
#[derive(Debug, Clone)]
pub struct ReactionEvent {
    added: bool,
    emoji: String,
    user: UserId,
    channel: ChannelId,
    guild: Option<GuildId>,
}

impl ReactionEvent {
    /// Creates a reaction-added event.
    pub fn added(
        emoji: impl Into<String>,
        user: UserId,
        channel: ChannelId,
        guild: Option<GuildId>,
    ) -> Self {
        Self {
            added: true,
            emoji: emoji.into(),
            user,
            channel,
            guild,
        }
    }

    /// Creates a reaction-removed event.
    pub fn removed(
        emoji: impl Into<String>,
        user: UserId,
        channel: ChannelId,
        guild: Option<GuildId>,
    ) -> Self {
        Self {
            added: false,
            emoji: emoji.into(),
            user,
            channel,
            guild,
        }
    }

    /// Returns the reaction emoji.
    pub fn emoji(&self) -> &str {
        &self.emoji
    }

    /// Returns the reacting user.
    pub fn user(&self) -> UserId {
        self.user
    }
}

impl Event for ReactionEvent {
    fn event_name(&self) -> &'static str {
        if self.added {
            "reaction_add"
        } else {
            "reaction_remove"
        }
    }

    fn guild_id(&self) -> Option<GuildId> {
        self.guild
    }

    fn channel_id(&self) -> Option<ChannelId> {
        Some(self.channel)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A member joined a guild. Carries no channel, so it bypasses the router's
/// channel-scope filter.
#[derive(Debug, Clone)]
pub struct MemberJoinEvent {
    member: Author,
    guild: GuildId,
}

impl MemberJoinEvent {
    /// Wraps a membership change.
    pub fn new(member: Author, guild: GuildId) -> Self {
        Self { member, guild }
    }

    /// Returns the joining member.
    pub fn member(&self) -> &Author {
        &self.member
    }
}

impl Event for MemberJoinEvent {
    fn event_name(&self) -> &'static str {
        "member_join"
    }

    fn guild_id(&self) -> Option<GuildId> {
        Some(self.guild)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

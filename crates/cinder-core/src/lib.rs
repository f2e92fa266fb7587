//! # Cinder Core
//!
//! The core event model of the Cinder bot framework.
//!
//! This crate provides the fundamental building blocks shared by the
//! framework and runtime layers:
//!
//! - **Events**: the [`Event`] trait, the type-erased [`BoxedEvent`]
//!   container, and the built-in message-shaped event types
//! - **Messages**: the [`ChatMessage`] payload, identifier newtypes, and
//!   [`Permission`] sets
//! - **Boundary contracts**: the [`ChannelScope`], [`PermissionLookup`], and
//!   [`Responder`] collaborator traits implemented by platform adapters
//!
//! Nothing in this crate performs I/O or owns mutable state; it is the
//! vocabulary the dispatch core in `cinder-framework` is written in.

pub mod boundary;
pub mod error;
pub mod event;
pub mod message;

pub use boundary::{ChannelScope, PermissionLookup, Responder};
pub use error::RespondError;
pub use event::{
    BoxedEvent, Event, MemberJoinEvent, MessageDeleteEvent, MessageEditEvent, MessageEvent,
    ReactionEvent,
};
pub use message::{
    Author, ChannelId, ChatMessage, GuildId, Permission, PermissionSet, UserId,
};

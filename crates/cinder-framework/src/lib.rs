//! Plugin-driven chat-event dispatch.
//!
//! This crate is the mechanism layer of Cinder: it turns a stream of
//! platform events into plugin handler invocations, without knowing anything
//! about the platform itself. The pipeline is:
//!
//! ```text
//! BoxedEvent ──► EventRouter ──► CommandDispatcher ──► spawned CommandHandler
//!                     │                                      tasks
//!                     └─────────► event fan-out ─────► spawned EventHandler
//!                                                            tasks
//! ```
//!
//! - [`args`] repairs whitespace-split arguments using the `!"…"` quoting
//!   convention.
//! - [`command::CommandSpec`] describes a command: name, aliases, required
//!   permissions, priority, and gating flags.
//! - [`registry::PluginRegistry`] owns plugin lifecycle and answers the two
//!   read-side queries: command resolution and subscriber lookup.
//! - [`dispatcher::CommandDispatcher`] runs the prefix → tokenize → resolve →
//!   gate → launch pipeline for messages.
//! - [`router::EventRouter`] is the single intake point, applying channel
//!   exclusion and fanning events out to subscribers.
//!
//! Platform concerns (who computes permissions, what a channel category is,
//! how replies are sent) enter through the boundary traits in
//! [`cinder_core`].

pub mod args;
pub mod command;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod plugin;
pub mod registry;
pub mod router;

pub use command::CommandSpec;
pub use context::CommandContext;
pub use dispatcher::{CommandDispatcher, DispatchOutcome};
pub use error::{RegistryError, TokenizeError};
pub use handler::{CommandHandler, EventHandler, HandlerError, command_fn, event_fn};
pub use plugin::{PluginModule, PluginState, Registrar};
pub use registry::{PluginRegistry, ResolvedCommand};
pub use router::{EventRouter, RouteSummary};

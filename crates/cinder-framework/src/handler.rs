//! Handler contracts for plugins.
//!
//! Plugins hand the registry two kinds of capabilities:
//!
//! - [`EventHandler`] — invoked for every occurrence of a subscribed event.
//! - [`CommandHandler`] — invoked for a winning command dispatch, receiving
//!   the per-dispatch [`CommandContext`].
//!
//! Both are fire-and-forget from the core's perspective: each invocation
//! runs in its own spawned task, a returned error is logged at the task
//! boundary with the owning plugin's identity, and nothing propagates back
//! into routing.
//!
//! The [`event_fn`] and [`command_fn`] adapters wrap plain async closures so
//! simple plugins don't need to define handler structs.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use cinder_core::BoxedEvent;

use crate::context::CommandContext;

/// The failure type handlers may return.
///
/// Caught at the task boundary and logged; never interpreted by the core.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// A generic-event handler.
///
/// Receives the event by cheap `Arc` clone. Handlers for the same event run
/// concurrently and must not assume mutual exclusion with each other.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handles one occurrence of a subscribed event.
    async fn handle(&self, event: BoxedEvent) -> Result<(), HandlerError>;
}

/// A command handler.
///
/// Receives the [`CommandContext`] by value — the context is created fresh
/// for each dispatch and owned solely by the task executing it.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Executes the command.
    async fn invoke(&self, ctx: CommandContext) -> Result<(), HandlerError>;
}

// ============================================================================
// Closure adapters
// ============================================================================

struct EventFn {
    f: Box<dyn Fn(BoxedEvent) -> BoxFuture<'static, Result<(), HandlerError>> + Send + Sync>,
}

#[async_trait]
impl EventHandler for EventFn {
    async fn handle(&self, event: BoxedEvent) -> Result<(), HandlerError> {
        (self.f)(event).await
    }
}

/// Wraps an async closure as an [`EventHandler`].
///
/// ```rust,ignore
/// let handler = event_fn(|event| async move {
///     tracing::info!(name = event.event_name(), "saw event");
///     Ok(())
/// });
/// ```
pub fn event_fn<F, Fut>(f: F) -> Arc<dyn EventHandler>
where
    F: Fn(BoxedEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    Arc::new(EventFn {
        f: Box::new(move |event| Box::pin(f(event))),
    })
}

struct CommandFn {
    f: Box<dyn Fn(CommandContext) -> BoxFuture<'static, Result<(), HandlerError>> + Send + Sync>,
}

#[async_trait]
impl CommandHandler for CommandFn {
    async fn invoke(&self, ctx: CommandContext) -> Result<(), HandlerError> {
        (self.f)(ctx).await
    }
}

/// Wraps an async closure as a [`CommandHandler`].
///
/// ```rust,ignore
/// let handler = command_fn(|ctx| async move {
///     tracing::info!(args = ?ctx.args(), "running command");
///     Ok(())
/// });
/// ```
pub fn command_fn<F, Fut>(f: F) -> Arc<dyn CommandHandler>
where
    F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    Arc::new(CommandFn {
        f: Box::new(move |ctx| Box::pin(f(ctx))),
    })
}

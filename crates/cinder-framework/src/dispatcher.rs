//! Command dispatch pipeline.
//!
//! The [`CommandDispatcher`] turns a prefixed chat message into exactly one
//! concurrent handler invocation, or into one of a small set of
//! test-observable refusal outcomes:
//!
//! 1. detect the command prefix (anything else is [`DispatchOutcome::NotCommand`])
//! 2. tokenize the remaining text, merging quoted spans
//! 3. resolve the first token to the highest-priority matching descriptor
//! 4. gate on the author's effective permissions
//! 5. gate on the command-channel scope, unless the descriptor opts out
//! 6. launch the handler as an independent task and return immediately
//!
//! Syntax and permission failures are surfaced to the invoking user through
//! the [`Responder`]; unknown commands and scope refusals are dropped
//! silently so that prefix collisions with ordinary chat produce no noise.

use std::sync::Arc;

use tracing::{Instrument, Level, debug, error, span, warn};

use cinder_core::{ChannelScope, ChatMessage, PermissionLookup, Responder};

use crate::args;
use crate::context::CommandContext;
use crate::registry::PluginRegistry;

/// The outcome of one dispatch attempt.
///
/// The wording of user-visible replies belongs to the dispatcher, but the
/// outcome *category* is part of the core's contract and is what tests
/// assert on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The message does not start with the command prefix.
    NotCommand,
    /// Tokenization failed; the user was told. No handler ran.
    SyntaxError,
    /// No activated descriptor matched the command token. Dropped silently.
    UnknownCommand,
    /// The author lacks a required permission; the user was told. No
    /// handler ran.
    PermissionDenied,
    /// The channel is outside the command-accepting scope and the
    /// descriptor does not set run-anywhere. Dropped silently.
    ScopeDenied,
    /// The winning handler was launched as an independent task.
    Launched {
        /// Plugin that owns the launched command.
        plugin: String,
        /// Canonical name of the launched command.
        command: String,
        /// Whether the descriptor asked for the invoking message to be
        /// deleted — acting on it is the host's job.
        delete_call: bool,
    },
}

/// Resolves, gates, and launches command handlers.
///
/// The dispatcher holds no mutable state of its own; everything it consults
/// lives in the registry or behind the collaborator traits.
pub struct CommandDispatcher {
    registry: Arc<PluginRegistry>,
    scope: Arc<dyn ChannelScope>,
    perms: Arc<dyn PermissionLookup>,
    responder: Arc<dyn Responder>,
    prefix: String,
    command_category: String,
}

impl CommandDispatcher {
    /// Creates a dispatcher.
    ///
    /// `prefix` is the command marker (typically `"!"`); `command_category`
    /// is the channel-category tag commands are confined to for descriptors
    /// without the run-anywhere flag.
    pub fn new(
        registry: Arc<PluginRegistry>,
        scope: Arc<dyn ChannelScope>,
        perms: Arc<dyn PermissionLookup>,
        responder: Arc<dyn Responder>,
        prefix: impl Into<String>,
        command_category: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            scope,
            perms,
            responder,
            prefix: prefix.into(),
            command_category: command_category.into(),
        }
    }

    /// The configured command prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Runs the dispatch pipeline for one message.
    ///
    /// Returns after the winning handler has been *launched*, never after it
    /// has completed; the spawned task is the unit of failure isolation.
    pub async fn dispatch(&self, message: &ChatMessage) -> DispatchOutcome {
        let Some(rest) = message.content.strip_prefix(&self.prefix) else {
            return DispatchOutcome::NotCommand;
        };

        let span = span!(Level::DEBUG, "dispatch", author = %message.author.name);
        self.dispatch_inner(message, rest).instrument(span).await
    }

    async fn dispatch_inner(&self, message: &ChatMessage, rest: &str) -> DispatchOutcome {
        let args = match args::tokenize(rest) {
            Ok(args) => args,
            Err(_) => {
                debug!("Rejecting command with unterminated quote");
                self.respond(
                    message,
                    &format!(
                        "**WARNING: Unterminated quote in arguments, {}.**",
                        message.author.display_name
                    ),
                )
                .await;
                return DispatchOutcome::SyntaxError;
            }
        };

        let Some(token) = args.first() else {
            // Bare prefix with no command token; treat like ordinary chat.
            return DispatchOutcome::UnknownCommand;
        };

        let candidates = self.registry.resolve(token);
        let Some(winner) = candidates.first() else {
            // Silent on purpose: the prefix collides with normal chat often
            // enough that complaining would be noise.
            return DispatchOutcome::UnknownCommand;
        };

        let effective = self
            .perms
            .effective_permissions(message.author.id, message.channel);
        if !winner.spec().perms().is_subset(&effective) {
            debug!(
                command = %winner.spec().name(),
                plugin = %winner.plugin(),
                "Author lacks required permissions"
            );
            self.respond(
                message,
                &format!(
                    "**NEGATIVE. INSUFFICIENT PERMISSION: {}.**",
                    message.author.display_name
                ),
            )
            .await;
            return DispatchOutcome::PermissionDenied;
        }

        if !winner.spec().is_run_anywhere()
            && !self
                .scope
                .is_in_category(message.guild, &self.command_category, message.channel)
        {
            debug!(
                command = %winner.spec().name(),
                channel = %message.channel,
                "Command used outside the command-channel scope"
            );
            return DispatchOutcome::ScopeDenied;
        }

        let plugin = winner.plugin().to_string();
        let command = winner.spec().name().to_string();
        let delete_call = winner.spec().is_delete_call();
        let ctx = CommandContext::new(
            message.clone(),
            args,
            effective,
            command.clone(),
            winner.spec().get_syntax().to_string(),
            plugin.clone(),
        );
        let handler = winner.handler();

        debug!(command = %command, plugin = %plugin, "Launching command handler");
        {
            let plugin = plugin.clone();
            let command = command.clone();
            tokio::spawn(async move {
                if let Err(e) = handler.invoke(ctx).await {
                    error!(
                        plugin = %plugin,
                        command = %command,
                        error = %e,
                        "Command handler failed"
                    );
                }
            });
        }

        DispatchOutcome::Launched {
            plugin,
            command,
            delete_call,
        }
    }

    async fn respond(&self, message: &ChatMessage, text: &str) {
        if let Err(e) = self.responder.send(message.channel, text).await {
            warn!(channel = %message.channel, error = %e, "Failed to deliver dispatch reply");
        }
    }
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("prefix", &self.prefix)
            .field("command_category", &self.command_category)
            .finish_non_exhaustive()
    }
}

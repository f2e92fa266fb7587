//! Per-dispatch invocation context.

use cinder_core::{ChatMessage, PermissionSet};

/// Everything a command handler gets to see about one invocation.
///
/// A `CommandContext` is created fresh for every dispatch attempt that makes
/// it past the permission and scope gates, moved into the handler task, and
/// dropped when the handler returns or fails. It is never shared.
#[derive(Debug, Clone)]
pub struct CommandContext {
    message: ChatMessage,
    args: Vec<String>,
    perms: PermissionSet,
    command: String,
    syntax: String,
    plugin: String,
}

impl CommandContext {
    pub(crate) fn new(
        message: ChatMessage,
        args: Vec<String>,
        perms: PermissionSet,
        command: String,
        syntax: String,
        plugin: String,
    ) -> Self {
        Self {
            message,
            args,
            perms,
            command,
            syntax,
            plugin,
        }
    }

    /// The message that triggered this invocation.
    pub fn message(&self) -> &ChatMessage {
        &self.message
    }

    /// The tokenized argument vector, quoted spans already merged.
    ///
    /// `args()[0]` is the token the command was resolved by (the canonical
    /// name or an alias, exactly as the user typed it).
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The author's effective permissions in the message's channel, as
    /// computed for the permission gate.
    pub fn perms(&self) -> &PermissionSet {
        &self.perms
    }

    /// Canonical name of the resolved command.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// The resolved command's usage syntax, for handler-side error replies.
    pub fn syntax(&self) -> &str {
        &self.syntax
    }

    /// Name of the plugin that owns the resolved command.
    pub fn plugin(&self) -> &str {
        &self.plugin
    }
}

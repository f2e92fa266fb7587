//! Error types for the Cinder framework.

use thiserror::Error;

use crate::plugin::PluginState;

/// Returned by the argument tokenizer when a quoted span is opened but never
/// closed, e.g. `!editrole !"my role name=red` (missing the closing `"`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unterminated quoted argument")]
pub struct TokenizeError;

/// Errors raised by [`PluginRegistry`](crate::registry::PluginRegistry)
/// lifecycle and registration operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A plugin with the same name is already registered.
    #[error("plugin '{0}' is already loaded")]
    DuplicatePlugin(String),

    /// The named plugin is not in the registry.
    #[error("no such plugin: '{0}'")]
    UnknownPlugin(String),

    /// Registration was attempted outside the plugin's `Loaded` window.
    ///
    /// Commands and subscriptions may only be registered between `load` and
    /// `activate`; calling the registration API on an activated plugin is a
    /// programming error and fails loudly.
    #[error("plugin '{plugin}' is {state:?}; registration is only valid while Loaded")]
    NotLoading {
        /// The offending plugin.
        plugin: String,
        /// Its current lifecycle state.
        state: PluginState,
    },

    /// A command name was registered twice by the same plugin.
    ///
    /// Names and aliases may collide *across* plugins, but within one plugin
    /// each descriptor name must be unique.
    #[error("plugin '{plugin}' already registered a command named '{command}'")]
    DuplicateCommand {
        /// The registering plugin.
        plugin: String,
        /// The colliding command name.
        command: String,
    },

    /// A lifecycle transition that the state machine does not permit.
    #[error("plugin '{plugin}' cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        /// The plugin whose transition was rejected.
        plugin: String,
        /// State the plugin is currently in.
        from: PluginState,
        /// State the caller asked for.
        to: PluginState,
    },

    /// The plugin's `setup` hook returned an error; the plugin was removed.
    #[error("plugin '{plugin}' failed to set up: {source}")]
    Setup {
        /// The plugin that failed.
        plugin: String,
        /// The error its `setup` hook returned.
        #[source]
        source: crate::handler::HandlerError,
    },
}

//! Plugin model, lifecycle states, and the load-time registration API.
//!
//! A plugin is defined by implementing [`PluginModule`]. When the registry
//! loads a module it calls [`PluginModule::setup`] exactly once, passing a
//! [`Registrar`] through which the plugin declares its commands and event
//! subscriptions. That window — the `Loaded` state — is the only time
//! registration is legal; the registrar fails loudly afterwards.
//!
//! ```rust,ignore
//! struct Roleplay;
//!
//! #[async_trait]
//! impl PluginModule for Roleplay {
//!     fn name(&self) -> &str {
//!         "roleplay"
//!     }
//!
//!     async fn setup(&self, reg: Registrar<'_>) -> Result<(), HandlerError> {
//!         reg.register_command(
//!             CommandSpec::new("roll").category("roleplay").syntax("(dice)"),
//!             command_fn(roll),
//!         )?;
//!         reg.subscribe("message", event_fn(log_message))?;
//!         Ok(())
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::command::CommandSpec;
use crate::error::RegistryError;
use crate::handler::{CommandHandler, EventHandler, HandlerError};
use crate::registry::PluginRegistry;

// ============================================================================
// Lifecycle state
// ============================================================================

/// Lifecycle state of a plugin in the registry.
///
/// ```text
/// load()        ──► Loaded       (registration window; receives no events)
/// activate()    ──► Activated    (the only dispatch-visible state)
/// deactivate()  ──► Deactivated  (descriptors stay registered, but dead)
/// activate()    ──► Activated    (reactivation after deactivate)
/// unload()      ──► Unloaded     (entry removed from the registry)
/// ```
///
/// A descriptor is visible to command resolution and event fan-out iff its
/// owning plugin is `Activated`; deactivation takes effect synchronously,
/// before any subsequent event reaches the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    /// Not present in the registry.
    Unloaded,
    /// Loaded and registering; handlers must not yet receive events.
    Loaded,
    /// Participating in routing and resolution.
    Activated,
    /// Withdrawn from routing; descriptors remain registered.
    Deactivated,
}

// ============================================================================
// PluginModule
// ============================================================================

/// A dynamically loadable unit owning zero or more commands and event
/// subscriptions.
#[async_trait]
pub trait PluginModule: Send + Sync {
    /// The plugin's unique name, used as its registry identity and config
    /// lookup key.
    fn name(&self) -> &str;

    /// Called once while the plugin is `Loaded`. Declare commands and
    /// subscriptions through `reg`; returning an error aborts the load and
    /// removes the plugin from the registry.
    async fn setup(&self, reg: Registrar<'_>) -> Result<(), HandlerError>;

    /// Called after the plugin transitions to `Deactivated`, before a
    /// potential unload. Tasks already running are not interrupted.
    async fn teardown(&self) {}
}

// ============================================================================
// Registrar
// ============================================================================

/// The registration API handed to a plugin's `setup` hook.
///
/// Both registration methods are valid only while the plugin is `Loaded`;
/// once activated, calls return [`RegistryError::NotLoading`].
pub struct Registrar<'a> {
    registry: &'a PluginRegistry,
    plugin: &'a str,
    config: Arc<Value>,
}

impl<'a> Registrar<'a> {
    pub(crate) fn new(registry: &'a PluginRegistry, plugin: &'a str, config: Arc<Value>) -> Self {
        Self {
            registry,
            plugin,
            config,
        }
    }

    /// Registers a command under this plugin.
    ///
    /// Descriptor names must be unique within the plugin; collisions with
    /// other plugins' names or aliases are allowed and resolved at dispatch
    /// time by priority.
    pub fn register_command(
        &self,
        spec: CommandSpec,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<(), RegistryError> {
        self.registry.register_command(self.plugin, spec, handler)
    }

    /// Subscribes this plugin to every event named `event_name`.
    pub fn subscribe(
        &self,
        event_name: impl Into<String>,
        handler: Arc<dyn EventHandler>,
    ) -> Result<(), RegistryError> {
        self.registry
            .subscribe(self.plugin, event_name.into(), handler)
    }

    /// This plugin's opaque configuration section, as supplied to
    /// [`PluginRegistry::load`](crate::registry::PluginRegistry::load).
    pub fn config(&self) -> Arc<Value> {
        Arc::clone(&self.config)
    }
}

// ============================================================================
// Internal record types (owned by the registry)
// ============================================================================

pub(crate) struct Subscription {
    pub(crate) event_name: String,
    pub(crate) handler: Arc<dyn EventHandler>,
}

pub(crate) struct RegisteredCommand {
    pub(crate) spec: CommandSpec,
    pub(crate) handler: Arc<dyn CommandHandler>,
}

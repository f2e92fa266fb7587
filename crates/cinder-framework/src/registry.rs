//! Plugin registry: lifecycle transitions and live descriptor lookup.
//!
//! [`PluginRegistry`] is the single owner of all plugin records. Nothing else
//! mutates plugin state. All mutation — loading, registration, lifecycle
//! transitions, unloading — is serialized behind one `RwLock`; the read side
//! (command resolution, fan-out snapshots) takes the lock briefly, clones the
//! `Arc`s it needs, and releases it, so readers never observe a half-updated
//! table and never hold the lock across an await point.
//!
//! Deactivation flips the plugin's state under the write lock before
//! anything else happens, so no event that reaches the router afterwards can
//! be delivered to a plugin mid-teardown. Tasks already launched are not
//! interrupted.

use std::cmp::Reverse;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info};

use crate::command::CommandSpec;
use crate::error::RegistryError;
use crate::handler::{CommandHandler, EventHandler};
use crate::plugin::{PluginModule, PluginState, RegisteredCommand, Registrar, Subscription};

// ============================================================================
// ResolvedCommand
// ============================================================================

/// One candidate produced by command resolution: a descriptor plus the
/// identity of its owning plugin.
#[derive(Clone)]
pub struct ResolvedCommand {
    plugin: Arc<str>,
    inner: Arc<RegisteredCommand>,
}

impl ResolvedCommand {
    /// Name of the plugin that owns this command.
    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    /// The command's descriptor.
    pub fn spec(&self) -> &CommandSpec {
        &self.inner.spec
    }

    pub(crate) fn handler(&self) -> Arc<dyn CommandHandler> {
        Arc::clone(&self.inner.handler)
    }
}

impl std::fmt::Debug for ResolvedCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedCommand")
            .field("plugin", &self.plugin)
            .field("command", &self.inner.spec.name())
            .field("priority", &self.inner.spec.get_priority())
            .finish()
    }
}

// ============================================================================
// PluginEntry (internal)
// ============================================================================

struct PluginEntry {
    name: Arc<str>,
    state: PluginState,
    module: Arc<dyn PluginModule>,
    config: Arc<Value>,
    subscriptions: Vec<Subscription>,
    commands: Vec<Arc<RegisteredCommand>>,
}

// ============================================================================
// PluginRegistry
// ============================================================================

/// Process-wide table of plugins, their lifecycle states, subscriptions,
/// and registered commands.
///
/// Entries keep their position in the table for the lifetime of the plugin;
/// table order is registration order and is the tie-break for command
/// resolution and the launch order for event fan-out.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: RwLock<Vec<PluginEntry>>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Loading and unloading ───────────────────────────────────────────────

    /// Loads a plugin module: inserts it as `Loaded` and runs its `setup`
    /// hook so it can register commands and subscriptions.
    ///
    /// The plugin receives no events until [`activate`](Self::activate) is
    /// called. If `setup` fails the entry is removed again and
    /// [`RegistryError::Setup`] is returned.
    pub async fn load(
        &self,
        module: Arc<dyn PluginModule>,
        config: Value,
    ) -> Result<(), RegistryError> {
        let name: Arc<str> = module.name().into();
        let config = Arc::new(config);
        {
            let mut plugins = self.plugins.write();
            if plugins.iter().any(|e| e.name == name) {
                return Err(RegistryError::DuplicatePlugin(name.to_string()));
            }
            plugins.push(PluginEntry {
                name: Arc::clone(&name),
                state: PluginState::Loaded,
                module: Arc::clone(&module),
                config: Arc::clone(&config),
                subscriptions: Vec::new(),
                commands: Vec::new(),
            });
        }

        let registrar = Registrar::new(self, &name, config);
        if let Err(source) = module.setup(registrar).await {
            self.remove_entry(&name);
            return Err(RegistryError::Setup {
                plugin: name.to_string(),
                source,
            });
        }

        info!(plugin = %name, "Plugin loaded");
        Ok(())
    }

    /// Removes a plugin from the registry entirely.
    ///
    /// Only legal from `Loaded` or `Deactivated`; an `Activated` plugin must
    /// be deactivated first so that in-flight dispatch decisions are based
    /// on a state that was flipped synchronously.
    pub fn unload(&self, name: &str) -> Result<(), RegistryError> {
        let mut plugins = self.plugins.write();
        let pos = plugins
            .iter()
            .position(|e| &*e.name == name)
            .ok_or_else(|| RegistryError::UnknownPlugin(name.to_string()))?;
        match plugins[pos].state {
            PluginState::Loaded | PluginState::Deactivated => {
                plugins.remove(pos);
                info!(plugin = %name, "Plugin unloaded");
                Ok(())
            }
            from => Err(RegistryError::InvalidTransition {
                plugin: name.to_string(),
                from,
                to: PluginState::Unloaded,
            }),
        }
    }

    fn remove_entry(&self, name: &str) {
        let mut plugins = self.plugins.write();
        if let Some(pos) = plugins.iter().position(|e| &*e.name == name) {
            plugins.remove(pos);
        }
    }

    // ─── Lifecycle transitions ───────────────────────────────────────────────

    /// Activates a `Loaded` or `Deactivated` plugin, making its commands and
    /// subscriptions visible to dispatch.
    pub fn activate(&self, name: &str) -> Result<(), RegistryError> {
        self.transition(name, PluginState::Activated)
    }

    /// Deactivates an `Activated` plugin and runs its `teardown` hook.
    ///
    /// The state flips under the write lock before `teardown` is awaited,
    /// so no event routed after this call returns can reach the plugin.
    /// Handler tasks already running are not interrupted.
    pub async fn deactivate(&self, name: &str) -> Result<(), RegistryError> {
        self.transition(name, PluginState::Deactivated)?;
        let module = {
            let plugins = self.plugins.read();
            plugins
                .iter()
                .find(|e| &*e.name == name)
                .map(|e| Arc::clone(&e.module))
        };
        if let Some(module) = module {
            module.teardown().await;
        }
        Ok(())
    }

    fn transition(&self, name: &str, to: PluginState) -> Result<(), RegistryError> {
        let mut plugins = self.plugins.write();
        let entry = plugins
            .iter_mut()
            .find(|e| &*e.name == name)
            .ok_or_else(|| RegistryError::UnknownPlugin(name.to_string()))?;
        let legal = matches!(
            (entry.state, to),
            (PluginState::Loaded, PluginState::Activated)
                | (PluginState::Deactivated, PluginState::Activated)
                | (PluginState::Activated, PluginState::Deactivated)
        );
        if !legal {
            return Err(RegistryError::InvalidTransition {
                plugin: name.to_string(),
                from: entry.state,
                to,
            });
        }
        entry.state = to;
        info!(plugin = %name, state = ?to, "Plugin state changed");
        Ok(())
    }

    /// Activates every `Loaded` or `Deactivated` plugin in one transition,
    /// so late-loaded plugins become visible atomically at startup.
    pub fn activate_all(&self) {
        let mut plugins = self.plugins.write();
        for entry in plugins.iter_mut() {
            if matches!(
                entry.state,
                PluginState::Loaded | PluginState::Deactivated
            ) {
                entry.state = PluginState::Activated;
                info!(plugin = %entry.name, "Plugin activated");
            }
        }
    }

    /// Deactivates every `Activated` plugin, then runs their `teardown`
    /// hooks in reverse registration order.
    ///
    /// All state flips complete before the first hook is awaited, so
    /// shutdown observes the same guarantee as [`deactivate`](Self::deactivate).
    pub async fn deactivate_all(&self) {
        let modules: Vec<Arc<dyn PluginModule>> = {
            let mut plugins = self.plugins.write();
            plugins
                .iter_mut()
                .filter(|e| e.state == PluginState::Activated)
                .map(|e| {
                    e.state = PluginState::Deactivated;
                    info!(plugin = %e.name, "Plugin deactivated");
                    Arc::clone(&e.module)
                })
                .collect()
        };
        for module in modules.into_iter().rev() {
            module.teardown().await;
        }
    }

    // ─── Introspection ───────────────────────────────────────────────────────

    /// Returns the lifecycle state of the named plugin.
    /// Unknown plugins report [`PluginState::Unloaded`].
    pub fn state(&self, name: &str) -> PluginState {
        self.plugins
            .read()
            .iter()
            .find(|e| &*e.name == name)
            .map(|e| e.state)
            .unwrap_or(PluginState::Unloaded)
    }

    /// Returns the number of plugins in the registry, in any state.
    pub fn plugin_count(&self) -> usize {
        self.plugins.read().len()
    }

    // ─── Registration (called through Registrar) ─────────────────────────────

    pub(crate) fn register_command(
        &self,
        plugin: &str,
        spec: CommandSpec,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<(), RegistryError> {
        let mut plugins = self.plugins.write();
        let entry = plugins
            .iter_mut()
            .find(|e| &*e.name == plugin)
            .ok_or_else(|| RegistryError::UnknownPlugin(plugin.to_string()))?;
        if entry.state != PluginState::Loaded {
            return Err(RegistryError::NotLoading {
                plugin: plugin.to_string(),
                state: entry.state,
            });
        }
        if entry.commands.iter().any(|c| c.spec.name() == spec.name()) {
            return Err(RegistryError::DuplicateCommand {
                plugin: plugin.to_string(),
                command: spec.name().to_string(),
            });
        }
        debug!(plugin = %plugin, command = %spec.name(), "Command registered");
        entry
            .commands
            .push(Arc::new(RegisteredCommand { spec, handler }));
        Ok(())
    }

    pub(crate) fn subscribe(
        &self,
        plugin: &str,
        event_name: String,
        handler: Arc<dyn EventHandler>,
    ) -> Result<(), RegistryError> {
        let mut plugins = self.plugins.write();
        let entry = plugins
            .iter_mut()
            .find(|e| &*e.name == plugin)
            .ok_or_else(|| RegistryError::UnknownPlugin(plugin.to_string()))?;
        if entry.state != PluginState::Loaded {
            return Err(RegistryError::NotLoading {
                plugin: plugin.to_string(),
                state: entry.state,
            });
        }
        debug!(plugin = %plugin, event = %event_name, "Event subscription registered");
        entry.subscriptions.push(Subscription {
            event_name,
            handler,
        });
        Ok(())
    }

    // ─── Resolution and fan-out snapshots ────────────────────────────────────

    /// Resolves a candidate command token against the live descriptor set.
    ///
    /// Matching is case-sensitive exact match on name or alias, restricted
    /// to `Activated` plugins. Candidates are ordered by descending priority,
    /// ties broken by ascending plugin registration order — a deterministic
    /// total order. Dispatch commits to the head only.
    ///
    /// Resolution never mutates the registry.
    pub fn resolve(&self, token: &str) -> Vec<ResolvedCommand> {
        let plugins = self.plugins.read();
        let mut candidates: Vec<(Reverse<i32>, usize, ResolvedCommand)> = plugins
            .iter()
            .enumerate()
            .filter(|(_, e)| e.state == PluginState::Activated)
            .flat_map(|(order, e)| {
                e.commands
                    .iter()
                    .filter(|c| c.spec.matches(token))
                    .map(move |c| {
                        (
                            Reverse(c.spec.get_priority()),
                            order,
                            ResolvedCommand {
                                plugin: Arc::clone(&e.name),
                                inner: Arc::clone(c),
                            },
                        )
                    })
            })
            .collect();
        candidates.sort_by_key(|(priority, order, _)| (*priority, *order));
        candidates.into_iter().map(|(_, _, c)| c).collect()
    }

    /// Snapshot of every `Activated` plugin subscribed to `event_name`, in
    /// plugin registration order. Plugins without a matching subscription
    /// are skipped entirely.
    pub(crate) fn subscribers(
        &self,
        event_name: &str,
    ) -> Vec<(Arc<str>, Arc<dyn EventHandler>)> {
        let plugins = self.plugins.read();
        plugins
            .iter()
            .filter(|e| e.state == PluginState::Activated)
            .flat_map(|e| {
                e.subscriptions
                    .iter()
                    .filter(|s| s.event_name == event_name)
                    .map(|s| (Arc::clone(&e.name), Arc::clone(&s.handler)))
            })
            .collect()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugin_count", &self.plugin_count())
            .finish()
    }
}

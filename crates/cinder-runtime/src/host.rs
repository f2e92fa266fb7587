//! Host orchestration.
//!
//! A [`Host`] wires the configuration and the platform collaborators into a
//! working event pipeline: one [`PluginRegistry`], one [`CommandDispatcher`],
//! one [`EventRouter`]. The embedding program owns the platform connection;
//! it feeds events in through [`Host::handle_event`] and supplies the
//! platform-specific lookups through the boundary traits.
//!
//! ```rust,ignore
//! let config = HostConfig::load()?;
//! logging::init_from_config(&config.logging);
//!
//! let host = Host::builder(scope, perms, responder)
//!     .config(config)
//!     .build();
//! host.load_plugin(Arc::new(Roleplay)).await?;
//! host.start();
//!
//! while let Some(event) = platform.next_event().await {
//!     host.handle_event(event).await;
//! }
//!
//! host.shutdown().await;
//! ```

use std::sync::Arc;

use tracing::info;

use cinder_core::{BoxedEvent, ChannelScope, PermissionLookup, Responder};
use cinder_framework::{
    CommandDispatcher, EventRouter, PluginModule, PluginRegistry, RouteSummary,
};

use crate::config::HostConfig;
use crate::error::RuntimeError;

/// Builder for a [`Host`].
///
/// The three collaborators are required; configuration defaults to
/// [`HostConfig::default`] when not supplied.
pub struct HostBuilder {
    scope: Arc<dyn ChannelScope>,
    perms: Arc<dyn PermissionLookup>,
    responder: Arc<dyn Responder>,
    config: Option<HostConfig>,
}

impl HostBuilder {
    /// Supplies the host configuration.
    pub fn config(mut self, config: HostConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the host.
    pub fn build(self) -> Host {
        let config = self.config.unwrap_or_default();
        let registry = Arc::new(PluginRegistry::new());
        let dispatcher = Arc::new(CommandDispatcher::new(
            Arc::clone(&registry),
            Arc::clone(&self.scope),
            self.perms,
            self.responder,
            config.command_prefix.clone(),
            config.command_category.clone(),
        ));
        let router = EventRouter::new(
            Arc::clone(&registry),
            dispatcher,
            self.scope,
            config.excluded_category.clone(),
        );
        Host {
            registry,
            router,
            config,
        }
    }
}

/// A configured event-processing pipeline.
pub struct Host {
    registry: Arc<PluginRegistry>,
    router: EventRouter,
    config: HostConfig,
}

impl Host {
    /// Starts building a host from the three platform collaborators.
    pub fn builder(
        scope: Arc<dyn ChannelScope>,
        perms: Arc<dyn PermissionLookup>,
        responder: Arc<dyn Responder>,
    ) -> HostBuilder {
        HostBuilder {
            scope,
            perms,
            responder,
            config: None,
        }
    }

    /// The plugin registry, for lifecycle control beyond start/shutdown.
    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    /// The active configuration.
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Loads a plugin, handing it its configuration section from the
    /// `plugins` table (or `null` when absent).
    ///
    /// The plugin stays `Loaded` until [`start`](Self::start) or an explicit
    /// `activate` call on the registry.
    pub async fn load_plugin(&self, module: Arc<dyn PluginModule>) -> Result<(), RuntimeError> {
        let section = self.config.plugin_section(module.name());
        info!(plugin = module.name(), "Loading plugin");
        self.registry.load(module, section).await?;
        Ok(())
    }

    /// Activates every loaded plugin. Events routed after this call see all
    /// of them.
    pub fn start(&self) {
        self.registry.activate_all();
        info!(plugins = self.registry.plugin_count(), "Host started");
    }

    /// Deactivates every plugin and awaits their teardown hooks.
    ///
    /// When this returns, no plugin is visible to routing; tasks already
    /// spawned by earlier events are not interrupted.
    pub async fn shutdown(&self) {
        self.registry.deactivate_all().await;
        info!("Host shut down");
    }

    /// Routes one platform event through the pipeline.
    pub async fn handle_event(&self, event: BoxedEvent) -> RouteSummary {
        self.router.route(event).await
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("plugins", &self.registry.plugin_count())
            .field("command_prefix", &self.config.command_prefix)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use cinder_core::{
        Author, ChannelId, ChatMessage, GuildId, MessageEvent, PermissionSet, RespondError, UserId,
    };
    use cinder_framework::{
        CommandSpec, DispatchOutcome, HandlerError, PluginState, Registrar, command_fn,
    };

    struct OpenScope;

    impl ChannelScope for OpenScope {
        fn is_in_category(
            &self,
            _guild: Option<GuildId>,
            category: &str,
            _channel: ChannelId,
        ) -> bool {
            // Every channel counts as a command channel, none as excluded.
            category == "commands"
        }
    }

    struct NoPerms;

    impl PermissionLookup for NoPerms {
        fn effective_permissions(&self, _user: UserId, _channel: ChannelId) -> PermissionSet {
            PermissionSet::new()
        }
    }

    struct NullResponder;

    #[async_trait]
    impl Responder for NullResponder {
        async fn send(&self, _channel: ChannelId, _text: &str) -> Result<(), RespondError> {
            Ok(())
        }
    }

    struct EchoPlugin {
        seen_config: Arc<Mutex<Option<serde_json::Value>>>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PluginModule for EchoPlugin {
        fn name(&self) -> &str {
            "echo"
        }

        async fn setup(&self, reg: Registrar<'_>) -> Result<(), HandlerError> {
            *self.seen_config.lock() = Some((*reg.config()).clone());
            let calls = Arc::clone(&self.calls);
            reg.register_command(
                CommandSpec::new("echo"),
                command_fn(move |_ctx| {
                    let calls = Arc::clone(&calls);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                }),
            )?;
            Ok(())
        }
    }

    fn test_host(config: HostConfig) -> Host {
        Host::builder(Arc::new(OpenScope), Arc::new(NoPerms), Arc::new(NullResponder))
            .config(config)
            .build()
    }

    fn message_event(content: &str) -> BoxedEvent {
        BoxedEvent::new(MessageEvent::new(ChatMessage::new(
            content,
            Author::new(UserId(1), "someone"),
            ChannelId(2),
            GuildId(3),
        )))
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn load_start_and_dispatch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let host = test_host(HostConfig::default());
        host.load_plugin(Arc::new(EchoPlugin {
            seen_config: Arc::new(Mutex::new(None)),
            calls: Arc::clone(&calls),
        }))
        .await
        .unwrap();

        // Not yet activated: the command resolves to nothing.
        let summary = host.handle_event(message_event("!echo hi")).await;
        assert_eq!(summary.command, Some(DispatchOutcome::UnknownCommand));

        host.start();
        let summary = host.handle_event(message_event("!echo hi")).await;
        assert!(matches!(
            summary.command,
            Some(DispatchOutcome::Launched { .. })
        ));
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn plugin_receives_its_config_section() {
        let mut config = HostConfig::default();
        config.plugins.insert(
            "echo".to_string(),
            serde_json::json!({ "volume": 11 }),
        );
        let seen = Arc::new(Mutex::new(None));
        let host = test_host(config);
        host.load_plugin(Arc::new(EchoPlugin {
            seen_config: Arc::clone(&seen),
            calls: Arc::new(AtomicUsize::new(0)),
        }))
        .await
        .unwrap();

        let section = seen.lock().clone().expect("setup should have run");
        assert_eq!(section["volume"], 11);
    }

    #[tokio::test]
    async fn configured_prefix_is_honored() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = HostConfig {
            command_prefix: "$".to_string(),
            ..HostConfig::default()
        };
        let host = test_host(config);
        host.load_plugin(Arc::new(EchoPlugin {
            seen_config: Arc::new(Mutex::new(None)),
            calls: Arc::clone(&calls),
        }))
        .await
        .unwrap();
        host.start();

        let summary = host.handle_event(message_event("!echo hi")).await;
        assert_eq!(summary.command, Some(DispatchOutcome::NotCommand));

        let summary = host.handle_event(message_event("$echo hi")).await;
        assert!(matches!(
            summary.command,
            Some(DispatchOutcome::Launched { .. })
        ));
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn shutdown_withdraws_plugins_before_returning() {
        let calls = Arc::new(AtomicUsize::new(0));
        let host = test_host(HostConfig::default());
        host.load_plugin(Arc::new(EchoPlugin {
            seen_config: Arc::new(Mutex::new(None)),
            calls: Arc::clone(&calls),
        }))
        .await
        .unwrap();
        host.start();

        host.shutdown().await;
        assert_eq!(host.registry().state("echo"), PluginState::Deactivated);

        let summary = host.handle_event(message_event("!echo hi")).await;
        assert_eq!(summary.command, Some(DispatchOutcome::UnknownCommand));
        assert_eq!(summary.notified, 0);
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}

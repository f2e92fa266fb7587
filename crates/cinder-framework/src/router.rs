//! Event intake and fan-out.
//!
//! The [`EventRouter`] is the single entry point for everything the host
//! observes. For each incoming event it:
//!
//! 1. drops the event entirely if it carries a channel and that channel sits
//!    in the excluded category (the bot pretends it cannot read there);
//! 2. runs the command dispatch pipeline when the event is message-shaped;
//! 3. fans the event out to every activated subscriber of its name, each in
//!    its own spawned task.
//!
//! Command dispatch and fan-out are independent stages: a message that
//! launched a command is still delivered to `"message"` subscribers, and a
//! refused or unknown command never suppresses fan-out. Events without a
//! channel (member joins, for instance) bypass the exclusion check.

use std::sync::Arc;

use tracing::{Instrument, Level, debug, error, span};

use cinder_core::{BoxedEvent, ChannelScope};

use crate::dispatcher::{CommandDispatcher, DispatchOutcome};
use crate::registry::PluginRegistry;

/// What happened to one routed event. Returned for observability; callers
/// may ignore it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSummary {
    /// The event was dropped by the channel-exclusion check; nothing ran.
    pub dropped: bool,
    /// Dispatch outcome, present iff the event was message-shaped.
    pub command: Option<DispatchOutcome>,
    /// Number of subscriber handlers launched.
    pub notified: usize,
}

impl RouteSummary {
    fn dropped() -> Self {
        Self {
            dropped: true,
            command: None,
            notified: 0,
        }
    }
}

/// Routes events to the command dispatcher and to event subscribers.
pub struct EventRouter {
    registry: Arc<PluginRegistry>,
    dispatcher: Arc<CommandDispatcher>,
    scope: Arc<dyn ChannelScope>,
    excluded_category: String,
}

impl EventRouter {
    /// Creates a router.
    ///
    /// `excluded_category` names the channel category whose events are
    /// discarded wholesale (typically `"noread"`).
    pub fn new(
        registry: Arc<PluginRegistry>,
        dispatcher: Arc<CommandDispatcher>,
        scope: Arc<dyn ChannelScope>,
        excluded_category: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            scope,
            excluded_category: excluded_category.into(),
        }
    }

    /// Routes one event through exclusion, command dispatch, and fan-out.
    ///
    /// Returns once every selected handler has been *launched*. Handlers run
    /// in their own tasks; their failures are logged at the task boundary and
    /// never affect each other or subsequent routing.
    pub async fn route(&self, event: BoxedEvent) -> RouteSummary {
        let span = span!(Level::DEBUG, "route", event = event.event_name());
        self.route_inner(event).instrument(span).await
    }

    async fn route_inner(&self, event: BoxedEvent) -> RouteSummary {
        if let Some(channel) = event.channel_id()
            && self
                .scope
                .is_in_category(event.guild_id(), &self.excluded_category, channel)
        {
            debug!(channel = %channel, "Dropping event from excluded channel");
            return RouteSummary::dropped();
        }

        let command = match event.as_message() {
            Some(message) => Some(self.dispatcher.dispatch(message).await),
            None => None,
        };

        let subscribers = self.registry.subscribers(event.event_name());
        let notified = subscribers.len();
        for (plugin, handler) in subscribers {
            let event = event.clone();
            let name = event.event_name();
            tokio::spawn(async move {
                if let Err(e) = handler.handle(event).await {
                    error!(
                        plugin = %plugin,
                        event = name,
                        error = %e,
                        "Event handler failed"
                    );
                }
            });
        }

        RouteSummary {
            dropped: false,
            command,
            notified,
        }
    }
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter")
            .field("excluded_category", &self.excluded_category)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::Value;

    use cinder_core::{
        Author, ChannelId, ChatMessage, GuildId, MemberJoinEvent, MessageEvent, PermissionLookup,
        PermissionSet, Responder, RespondError, UserId,
    };

    use crate::command::CommandSpec;
    use crate::handler::{HandlerError, command_fn, event_fn};
    use crate::plugin::{PluginModule, Registrar};

    /// Marks exactly one category, `"noread"`, as containing channel 66.
    struct NoreadScope;

    impl ChannelScope for NoreadScope {
        fn is_in_category(
            &self,
            _guild: Option<GuildId>,
            category: &str,
            channel: ChannelId,
        ) -> bool {
            category == "noread" && channel == ChannelId(66)
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

    type SetupFn =
        Box<dyn Fn(&Registrar<'_>) -> Result<(), HandlerError> + Send + Sync>;

    struct TestPlugin {
        name: &'static str,
        setup: SetupFn,
    }

    #[async_trait]
    impl PluginModule for TestPlugin {
        fn name(&self) -> &str {
            self.name
        }

        async fn setup(&self, reg: Registrar<'_>) -> Result<(), HandlerError> {
            (self.setup)(&reg)
        }
    }

    fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let c = Arc::new(AtomicUsize::new(0));
        (Arc::clone(&c), c)
    }

    fn router_over(registry: Arc<PluginRegistry>) -> EventRouter {
        let scope: Arc<dyn ChannelScope> = Arc::new(NoreadScope);
        let dispatcher = Arc::new(CommandDispatcher::new(
            Arc::clone(&registry),
            Arc::clone(&scope),
            Arc::new(NoPerms),
            Arc::new(NullResponder),
            "!",
            "commands",
        ));
        EventRouter::new(registry, dispatcher, scope, "noread")
    }

    fn message_event(content: &str, channel: u64) -> BoxedEvent {
        BoxedEvent::new(MessageEvent::new(ChatMessage::new(
            content,
            Author::new(UserId(1), "someone"),
            ChannelId(channel),
            GuildId(5),
        )))
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn subscribers_receive_events_in_their_own_tasks() {
        let (calls, calls_keep) = counter();
        let registry = Arc::new(PluginRegistry::new());
        registry
            .load(
                Arc::new(TestPlugin {
                    name: "logger",
                    setup: Box::new(move |reg| {
                        let calls = Arc::clone(&calls);
                        reg.subscribe(
                            "message",
                            event_fn(move |_event| {
                                let calls = Arc::clone(&calls);
                                async move {
                                    calls.fetch_add(1, Ordering::SeqCst);
                                    Ok(())
                                }
                            }),
                        )?;
                        Ok(())
                    }),
                }),
                Value::Null,
            )
            .await
            .unwrap();
        registry.activate_all();
        let router = router_over(registry);

        let summary = router.route(message_event("hello there", 7)).await;
        assert!(!summary.dropped);
        assert_eq!(summary.notified, 1);
        settle().await;
        assert_eq!(calls_keep.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn excluded_channel_suppresses_everything() {
        let (calls, calls_keep) = counter();
        let registry = Arc::new(PluginRegistry::new());
        registry
            .load(
                Arc::new(TestPlugin {
                    name: "logger",
                    setup: Box::new(move |reg| {
                        let calls = Arc::clone(&calls);
                        reg.subscribe(
                            "message",
                            event_fn(move |_event| {
                                let calls = Arc::clone(&calls);
                                async move {
                                    calls.fetch_add(1, Ordering::SeqCst);
                                    Ok(())
                                }
                            }),
                        )?;
                        reg.register_command(
                            CommandSpec::new("ping"),
                            command_fn(|_ctx| async { Ok(()) }),
                        )?;
                        Ok(())
                    }),
                }),
                Value::Null,
            )
            .await
            .unwrap();
        registry.activate_all();
        let router = router_over(registry);

        // Channel 66 is in the "noread" category.
        let summary = router.route(message_event("!ping", 66)).await;
        assert!(summary.dropped);
        assert_eq!(summary.command, None);
        assert_eq!(summary.notified, 0);
        settle().await;
        assert_eq!(calls_keep.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn channel_less_events_bypass_the_exclusion_check() {
        let (calls, calls_keep) = counter();
        let registry = Arc::new(PluginRegistry::new());
        registry
            .load(
                Arc::new(TestPlugin {
                    name: "greeter",
                    setup: Box::new(move |reg| {
                        let calls = Arc::clone(&calls);
                        reg.subscribe(
                            "member_join",
                            event_fn(move |_event| {
                                let calls = Arc::clone(&calls);
                                async move {
                                    calls.fetch_add(1, Ordering::SeqCst);
                                    Ok(())
                                }
                            }),
                        )?;
                        Ok(())
                    }),
                }),
                Value::Null,
            )
            .await
            .unwrap();
        registry.activate_all();
        let router = router_over(registry);

        let event = BoxedEvent::new(MemberJoinEvent::new(
            Author::new(UserId(9), "newcomer"),
            GuildId(5),
        ));
        let summary = router.route(event).await;
        assert!(!summary.dropped);
        assert_eq!(summary.command, None);
        settle().await;
        assert_eq!(calls_keep.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn command_dispatch_does_not_suppress_fan_out() {
        let (sub_calls, sub_keep) = counter();
        let (cmd_calls, cmd_keep) = counter();
        let registry = Arc::new(PluginRegistry::new());
        registry
            .load(
                Arc::new(TestPlugin {
                    name: "both",
                    setup: Box::new(move |reg| {
                        let sub_calls = Arc::clone(&sub_calls);
                        let cmd_calls = Arc::clone(&cmd_calls);
                        reg.subscribe(
                            "message",
                            event_fn(move |_event| {
                                let sub_calls = Arc::clone(&sub_calls);
                                async move {
                                    sub_calls.fetch_add(1, Ordering::SeqCst);
                                    Ok(())
                                }
                            }),
                        )?;
                        reg.register_command(
                            CommandSpec::new("ping"),
                            command_fn(move |_ctx| {
                                let cmd_calls = Arc::clone(&cmd_calls);
                                async move {
                                    cmd_calls.fetch_add(1, Ordering::SeqCst);
                                    Ok(())
                                }
                            }),
                        )?;
                        Ok(())
                    }),
                }),
                Value::Null,
            )
            .await
            .unwrap();
        registry.activate_all();
        let router = router_over(registry);

        // A message that launches a command still reaches subscribers.
        let summary = router.route(message_event("!ping", 7)).await;
        assert!(matches!(
            summary.command,
            Some(DispatchOutcome::Launched { .. })
        ));
        assert_eq!(summary.notified, 1);
        settle().await;
        assert_eq!(sub_keep.load(Ordering::SeqCst), 1);
        assert_eq!(cmd_keep.load(Ordering::SeqCst), 1);

        // So does one that resolves to nothing.
        let summary = router.route(message_event("!nonsense", 7)).await;
        assert_eq!(summary.command, Some(DispatchOutcome::UnknownCommand));
        settle().await;
        assert_eq!(sub_keep.load(Ordering::SeqCst), 2);
        assert_eq!(cmd_keep.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_subscriber_does_not_disturb_the_others() {
        let (calls, calls_keep) = counter();
        let registry = Arc::new(PluginRegistry::new());
        registry
            .load(
                Arc::new(TestPlugin {
                    name: "flaky",
                    setup: Box::new(|reg| {
                        reg.subscribe(
                            "message",
                            event_fn(|_event| async { Err("flaky handler".into()) }),
                        )?;
                        Ok(())
                    }),
                }),
                Value::Null,
            )
            .await
            .unwrap();
        registry
            .load(
                Arc::new(TestPlugin {
                    name: "steady",
                    setup: Box::new(move |reg| {
                        let calls = Arc::clone(&calls);
                        reg.subscribe(
                            "message",
                            event_fn(move |_event| {
                                let calls = Arc::clone(&calls);
                                async move {
                                    calls.fetch_add(1, Ordering::SeqCst);
                                    Ok(())
                                }
                            }),
                        )?;
                        Ok(())
                    }),
                }),
                Value::Null,
            )
            .await
            .unwrap();
        registry.activate_all();
        let router = router_over(registry);

        let summary = router.route(message_event("hello", 7)).await;
        assert_eq!(summary.notified, 2);
        settle().await;
        assert_eq!(calls_keep.load(Ordering::SeqCst), 1);

        // And routing keeps working afterwards.
        let summary = router.route(message_event("again", 7)).await;
        assert_eq!(summary.notified, 2);
        settle().await;
        assert_eq!(calls_keep.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn deactivation_takes_effect_before_the_next_event() {
        let (calls, calls_keep) = counter();
        let registry = Arc::new(PluginRegistry::new());
        registry
            .load(
                Arc::new(TestPlugin {
                    name: "logger",
                    setup: Box::new(move |reg| {
                        let calls = Arc::clone(&calls);
                        reg.subscribe(
                            "message",
                            event_fn(move |_event| {
                                let calls = Arc::clone(&calls);
                                async move {
                                    calls.fetch_add(1, Ordering::SeqCst);
                                    Ok(())
                                }
                            }),
                        )?;
                        Ok(())
                    }),
                }),
                Value::Null,
            )
            .await
            .unwrap();
        registry.activate_all();
        let router = router_over(Arc::clone(&registry));

        router.route(message_event("before", 7)).await;
        settle().await;
        assert_eq!(calls_keep.load(Ordering::SeqCst), 1);

        registry.deactivate("logger").await.unwrap();
        let summary = router.route(message_event("after", 7)).await;
        assert_eq!(summary.notified, 0);
        settle().await;
        assert_eq!(calls_keep.load(Ordering::SeqCst), 1);
    }
}

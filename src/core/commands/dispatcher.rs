// Dispatch loop core - classifies an inbound interaction and routes it to
// the command registry or the component registry.
//
// Every handler failure is translated HERE, in one place, into the reply the
// user sees. Handlers only return `CommandError`s.

use super::command_models::{
    CommandError, CommandInvocation, CommandResult, ComponentEvent, Reply,
};
use super::command_registry::{CommandContext, CommandRegistry};
use super::component_registry::ComponentRegistry;
use std::sync::Arc;

/// An interaction as delivered by the platform, already stripped of
/// platform types.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    Command(CommandInvocation),
    Component(ComponentEvent),
    /// Any other interaction kind (autocomplete, modal submit, ...).
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClass {
    Command,
    Component,
    Ignored,
}

impl InboundEvent {
    pub fn class(&self) -> EventClass {
        match self {
            InboundEvent::Command(_) => EventClass::Command,
            InboundEvent::Component(_) => EventClass::Component,
            InboundEvent::Other(_) => EventClass::Ignored,
        }
    }
}

/// What happened to one inbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// A handler ran. `reply` is either its reply or the translated failure.
    Replied { class: EventClass, reply: Reply },
    /// Command name or component id not registered; dropped without a reply.
    Unrouted { class: EventClass, key: String },
    /// Not a command or component interaction.
    Ignored,
}

impl DispatchOutcome {
    pub fn reply(&self) -> Option<&Reply> {
        match self {
            DispatchOutcome::Replied { reply, .. } => Some(reply),
            _ => None,
        }
    }
}

pub struct Dispatcher<D> {
    commands: Arc<CommandRegistry<D>>,
    components: Arc<ComponentRegistry<D>>,
    data: Arc<D>,
}

impl<D: Send + Sync + 'static> Dispatcher<D> {
    pub fn new(
        commands: Arc<CommandRegistry<D>>,
        components: Arc<ComponentRegistry<D>>,
        data: Arc<D>,
    ) -> Self {
        Self {
            commands,
            components,
            data,
        }
    }

    pub fn commands(&self) -> &CommandRegistry<D> {
        &self.commands
    }

    pub fn components(&self) -> &Arc<ComponentRegistry<D>> {
        &self.components
    }

    pub fn data(&self) -> &Arc<D> {
        &self.data
    }

    /// Whether the platform should acknowledge `event` before it is
    /// dispatched. Only registered commands marked deferred qualify.
    pub fn defers(&self, event: &InboundEvent) -> bool {
        match event {
            InboundEvent::Command(invocation) => self
                .commands
                .lookup(&invocation.name)
                .is_some_and(|command| command.deferred),
            _ => false,
        }
    }

    /// Handle one event. At most one handler runs; nothing is queued or
    /// retried.
    pub async fn dispatch(&self, event: InboundEvent) -> DispatchOutcome {
        match event {
            InboundEvent::Command(invocation) => self.dispatch_command(invocation).await,
            InboundEvent::Component(event) => self.dispatch_component(event).await,
            InboundEvent::Other(kind) => {
                tracing::trace!(kind = %kind, "Ignoring interaction");
                DispatchOutcome::Ignored
            }
        }
    }

    async fn dispatch_command(&self, invocation: CommandInvocation) -> DispatchOutcome {
        let Some(command) = self.commands.lookup(&invocation.name) else {
            tracing::debug!(command = %invocation.name, "Dropping unknown command");
            return DispatchOutcome::Unrouted {
                class: EventClass::Command,
                key: invocation.name,
            };
        };

        tracing::info!(
            command = %invocation.name,
            user_id = invocation.user_id,
            guild_id = ?invocation.guild_id,
            "Running command"
        );

        let ctx = CommandContext {
            invocation: &invocation,
            registry: &self.commands,
            components: &self.components,
            data: &self.data,
        };
        let result = command.handler.handle(ctx).await;

        DispatchOutcome::Replied {
            class: EventClass::Command,
            reply: settle(&invocation.name, invocation.user_id, result),
        }
    }

    async fn dispatch_component(&self, event: ComponentEvent) -> DispatchOutcome {
        match self.components.dispatch(&event, &self.data).await {
            Some(result) => DispatchOutcome::Replied {
                class: EventClass::Component,
                reply: settle(&event.custom_id, event.user_id, result),
            },
            None => {
                tracing::debug!(custom_id = %event.custom_id, "Dropping unrouted component interaction");
                DispatchOutcome::Unrouted {
                    class: EventClass::Component,
                    key: event.custom_id,
                }
            }
        }
    }
}

/// The single translator from handler failures to user-facing replies.
fn settle(key: &str, user_id: u64, result: CommandResult) -> Reply {
    match result {
        Ok(reply) => reply,
        Err(err) => {
            match &err {
                CommandError::PermissionDenied(_) | CommandError::Validation(_) => {
                    tracing::debug!(key, user_id, kind = err.kind_label(), "Handler refused: {}", err);
                }
                CommandError::Parse { .. } => {
                    tracing::warn!(key, user_id, kind = err.kind_label(), "Handler failed: {}", err);
                }
                CommandError::Io(_) | CommandError::Other(_) => {
                    tracing::error!(key, user_id, kind = err.kind_label(), "Handler failed: {:#}", err);
                }
            }
            Reply::ephemeral(err.user_message())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commands::command_models::Permission;
    use crate::core::commands::command_registry::CommandHandler;
    use crate::core::commands::component_registry::{
        ComponentContext, ComponentHandler, ComponentLifetime,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Calls {
        commands: AtomicUsize,
        components: AtomicUsize,
    }

    struct CountingCommand;

    #[async_trait]
    impl CommandHandler<Calls> for CountingCommand {
        async fn handle(&self, ctx: CommandContext<'_, Calls>) -> CommandResult {
            ctx.data.commands.fetch_add(1, Ordering::SeqCst);
            Ok(Reply::text("done"))
        }
    }

    struct GuardedCommand;

    #[async_trait]
    impl CommandHandler<Calls> for GuardedCommand {
        async fn handle(&self, ctx: CommandContext<'_, Calls>) -> CommandResult {
            ctx.invocation.require_permission(Permission::BanMembers)?;
            Ok(Reply::text("banned"))
        }
    }

    struct FailingCommand;

    #[async_trait]
    impl CommandHandler<Calls> for FailingCommand {
        async fn handle(&self, _ctx: CommandContext<'_, Calls>) -> CommandResult {
            Err(CommandError::Io("users.json: permission denied".into()))
        }
    }

    struct CountingComponent;

    #[async_trait]
    impl ComponentHandler<Calls> for CountingComponent {
        async fn handle(&self, ctx: ComponentContext<'_, Calls>) -> CommandResult {
            ctx.data.components.fetch_add(1, Ordering::SeqCst);
            Ok(Reply::ephemeral("Answer submitted!"))
        }
    }

    fn dispatcher() -> Dispatcher<Calls> {
        let mut commands: CommandRegistry<Calls> = CommandRegistry::new();
        commands.register("count", "", vec![], Arc::new(CountingCommand));
        commands.register("ban", "", vec![], Arc::new(GuardedCommand));
        commands.register("broken", "", vec![], Arc::new(FailingCommand));
        commands.register("slow", "", vec![], Arc::new(CountingCommand));
        commands.set_deferred("slow");
        Dispatcher::new(
            Arc::new(commands),
            Arc::new(ComponentRegistry::new()),
            Arc::new(Calls::default()),
        )
    }

    #[test]
    fn events_are_classified() {
        assert_eq!(
            InboundEvent::Command(CommandInvocation::default()).class(),
            EventClass::Command
        );
        assert_eq!(
            InboundEvent::Component(ComponentEvent::default()).class(),
            EventClass::Component
        );
        assert_eq!(
            InboundEvent::Other("autocomplete".into()).class(),
            EventClass::Ignored
        );
    }

    #[tokio::test]
    async fn unknown_command_is_dropped_without_invoking_anything() {
        let dispatcher = dispatcher();
        let outcome = dispatcher
            .dispatch(InboundEvent::Command(CommandInvocation::new("nope", 1, 2)))
            .await;

        assert_eq!(
            outcome,
            DispatchOutcome::Unrouted {
                class: EventClass::Command,
                key: "nope".into()
            }
        );
        assert_eq!(dispatcher.data().commands.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn known_command_runs_once() {
        let dispatcher = dispatcher();
        let outcome = dispatcher
            .dispatch(InboundEvent::Command(CommandInvocation::new("count", 1, 2)))
            .await;

        assert_eq!(outcome.reply(), Some(&Reply::text("done")));
        assert_eq!(dispatcher.data().commands.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn component_with_known_id_invokes_exactly_that_handler_once() {
        let dispatcher = dispatcher();
        dispatcher.components().register(
            "question_77_0",
            ComponentLifetime::Persistent,
            Arc::new(CountingComponent),
        );

        let outcome = dispatcher
            .dispatch(InboundEvent::Component(ComponentEvent {
                custom_id: "question_77_0".into(),
                ..Default::default()
            }))
            .await;
        assert_eq!(outcome.reply(), Some(&Reply::ephemeral("Answer submitted!")));
        assert_eq!(dispatcher.data().components.load(Ordering::SeqCst), 1);

        let outcome = dispatcher
            .dispatch(InboundEvent::Component(ComponentEvent {
                custom_id: "question_77_1".into(),
                ..Default::default()
            }))
            .await;
        assert!(matches!(outcome, DispatchOutcome::Unrouted { .. }));
        assert_eq!(dispatcher.data().components.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn only_commands_marked_deferred_are_deferred() {
        let dispatcher = dispatcher();
        let command = |name: &str| InboundEvent::Command(CommandInvocation::new(name, 1, 2));

        assert!(dispatcher.defers(&command("slow")));
        assert!(!dispatcher.defers(&command("count")));
        assert!(!dispatcher.defers(&command("nope")));
        assert!(!dispatcher.defers(&InboundEvent::Component(ComponentEvent::default())));

        // Deferring changes how the reply is delivered, not what it says.
        let outcome = dispatcher.dispatch(command("slow")).await;
        assert_eq!(outcome.reply(), Some(&Reply::text("done")));
    }

    #[tokio::test]
    async fn other_interactions_are_ignored() {
        let dispatcher = dispatcher();
        let outcome = dispatcher
            .dispatch(InboundEvent::Other("modal_submit".into()))
            .await;
        assert_eq!(outcome, DispatchOutcome::Ignored);
    }

    #[tokio::test]
    async fn failures_are_translated_to_ephemeral_replies() {
        let dispatcher = dispatcher();

        let denied = dispatcher
            .dispatch(InboundEvent::Command(CommandInvocation::new("ban", 1, 2)))
            .await;
        assert_eq!(
            denied.reply(),
            Some(&Reply::ephemeral(
                "You do not have permission to use this command."
            ))
        );

        let allowed = dispatcher
            .dispatch(InboundEvent::Command(
                CommandInvocation::new("ban", 1, 2).with_permission(Permission::BanMembers),
            ))
            .await;
        assert_eq!(allowed.reply(), Some(&Reply::text("banned")));

        let broken = dispatcher
            .dispatch(InboundEvent::Command(CommandInvocation::new("broken", 1, 2)))
            .await;
        let reply = broken.reply().unwrap();
        assert!(reply.ephemeral);
        assert!(!reply.content.contains("users.json"));
    }
}

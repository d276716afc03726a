// Command registry - maps command names to their declaration and handler.
//
// The registry is built once at startup in the composition root and then
// shared read-only (behind an Arc) with the dispatcher. It is generic over
// `D`, the application data handed to every handler, so the core never has
// to know which services the bot wires in.

use super::command_models::{Argument, CommandInvocation, CommandResult};
use super::component_registry::ComponentRegistry;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

const DEFAULT_DESCRIPTION: &str = "No description provided";

/// Everything a command handler gets to work with.
pub struct CommandContext<'a, D> {
    pub invocation: &'a CommandInvocation,
    pub registry: &'a CommandRegistry<D>,
    pub components: &'a Arc<ComponentRegistry<D>>,
    pub data: &'a Arc<D>,
}

/// Trait for slash command handlers.
///
/// Handlers return a `Reply` on success or a `CommandError` describing what
/// went wrong. They never format error replies themselves.
#[async_trait]
pub trait CommandHandler<D>: Send + Sync {
    async fn handle(&self, ctx: CommandContext<'_, D>) -> CommandResult;
}

/// A registered command: declaration plus handler.
pub struct Command<D> {
    pub name: String,
    pub description: String,
    pub options: Vec<Argument>,
    pub handler: Arc<dyn CommandHandler<D>>,
    /// Acknowledge the interaction before the handler runs. For commands
    /// that make network calls and can miss the 3 second response window.
    pub deferred: bool,
}

/// Registry of commands keyed by unique name.
///
/// Registering an existing name replaces the entry in place, so `list`
/// keeps the original insertion position of that name.
pub struct CommandRegistry<D> {
    commands: Vec<Command<D>>,
    index: HashMap<String, usize>,
}

impl<D: Send + Sync + 'static> CommandRegistry<D> {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert or replace the command called `name` and return the stored entry.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        options: Vec<Argument>,
        handler: Arc<dyn CommandHandler<D>>,
    ) -> &Command<D> {
        let name = name.into();
        let mut description = description.into();
        if description.trim().is_empty() {
            description = DEFAULT_DESCRIPTION.to_string();
        }

        let command = Command {
            name: name.clone(),
            description,
            options,
            handler,
            deferred: false,
        };

        let position = match self.index.get(&name) {
            Some(&position) => {
                tracing::debug!(command = %name, "Replacing registered command");
                self.commands[position] = command;
                position
            }
            None => {
                self.commands.push(command);
                let position = self.commands.len() - 1;
                self.index.insert(name, position);
                position
            }
        };

        &self.commands[position]
    }

    /// Mark `name` as deferred. Returns false when no such command exists.
    pub fn set_deferred(&mut self, name: &str) -> bool {
        match self.index.get(name) {
            Some(&position) => {
                self.commands[position].deferred = true;
                true
            }
            None => false,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Command<D>> {
        self.index.get(name).map(|&position| &self.commands[position])
    }

    /// All commands in registration order.
    pub fn list(&self) -> &[Command<D>] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl<D: Send + Sync + 'static> Default for CommandRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}

// `/help`: the command list, or the arguments of one command.

use crate::core::commands::{Argument, CommandError, CommandHandler, CommandResult, Reply};
use crate::discord::bot_data::{BotData, Commands, Context};
use async_trait::async_trait;
use std::sync::Arc;

pub fn register(commands: &mut Commands) {
    commands.register(
        "help",
        "List all commands, or show the arguments of one command",
        vec![Argument::optional("command", "The command to get help for")],
        Arc::new(Help),
    );
}

pub struct Help;

#[async_trait]
impl CommandHandler<BotData> for Help {
    async fn handle(&self, ctx: Context<'_>) -> CommandResult {
        let requested = ctx
            .invocation
            .string("command")
            .map(|name| name.trim().trim_start_matches('/'))
            .filter(|name| !name.is_empty());

        let Some(name) = requested else {
            let list = ctx
                .registry
                .list()
                .iter()
                .map(|c| format!("**{}**", c.name))
                .collect::<Vec<_>>()
                .join(", ");
            return Ok(Reply::text(format!("Available commands: {}", list)));
        };

        let command = ctx
            .registry
            .lookup(name)
            .ok_or_else(|| CommandError::Validation(format!("Command {} not found.", name)))?;

        let mut text = format!("Command {}: {}", command.name, command.description);
        for option in &command.options {
            let marker = if option.required { "" } else { " (optional)" };
            text.push_str(&format!("\n{}: {}{}", option.name, option.description, marker));
        }

        Ok(Reply::text(text))
    }
}

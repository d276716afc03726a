// Publishing the command registry as Discord application commands.

use crate::core::commands::{ArgumentKind, Command, CommandRegistry};
use serenity::all::{
    Command as PlatformCommand, CommandOptionType, CreateCommand, CreateCommandOption, GuildId,
    Http,
};

pub fn option_type(kind: ArgumentKind) -> CommandOptionType {
    match kind {
        ArgumentKind::String => CommandOptionType::String,
        ArgumentKind::Integer => CommandOptionType::Integer,
        ArgumentKind::Boolean => CommandOptionType::Boolean,
        ArgumentKind::User => CommandOptionType::User,
        ArgumentKind::Channel => CommandOptionType::Channel,
        ArgumentKind::Role => CommandOptionType::Role,
        ArgumentKind::Attachment => CommandOptionType::Attachment,
    }
}

pub fn create_command<D>(command: &Command<D>) -> CreateCommand {
    command.options.iter().fold(
        CreateCommand::new(&command.name).description(&command.description),
        |builder, argument| {
            builder.add_option(
                CreateCommandOption::new(
                    option_type(argument.kind),
                    &argument.name,
                    &argument.description,
                )
                .required(argument.required),
            )
        },
    )
}

pub fn create_commands<D: Send + Sync + 'static>(registry: &CommandRegistry<D>) -> Vec<CreateCommand> {
    registry.list().iter().map(create_command).collect()
}

/// Where the command set is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishScope {
    /// Every guild the bot is in. Can take up to an hour to propagate.
    Global,
    /// One development guild only, where updates show up immediately.
    /// Global commands are left alone, so they never show up twice there.
    Guild(u64),
}

impl PublishScope {
    pub fn for_guild(guild_id: Option<u64>) -> Self {
        guild_id.map_or(PublishScope::Global, PublishScope::Guild)
    }
}

/// Bulk-replace the command set of `scope`.
///
/// Failures are logged only. Local registrations stay as they are and the
/// next startup publishes again.
pub async fn publish_commands<D: Send + Sync + 'static>(
    http: &Http,
    registry: &CommandRegistry<D>,
    scope: PublishScope,
) {
    let commands = create_commands(registry);

    match scope {
        PublishScope::Global => match PlatformCommand::set_global_commands(http, commands).await {
            Ok(published) => tracing::info!(count = published.len(), "Published global commands"),
            Err(err) => tracing::error!("Failed to publish global commands: {}", err),
        },
        PublishScope::Guild(guild_id) => match GuildId::new(guild_id).set_commands(http, commands).await {
            Ok(published) => {
                tracing::info!(guild_id, count = published.len(), "Published guild commands")
            }
            Err(err) => tracing::error!(guild_id, "Failed to publish guild commands: {}", err),
        },
    }
}

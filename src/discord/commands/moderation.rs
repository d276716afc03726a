// Moderation commands: ban, kick and timed mute.
//
// Each command refuses unless the invoker holds the matching guild
// permission. Failures of the action itself (missing bot permission,
// member not found) come back as `PlatformError`s.

use crate::core::commands::{
    Argument, ArgumentKind, CommandError, CommandHandler, CommandResult, Permission, Reply,
};
use crate::core::helpers::resolve_time_string;
use crate::discord::bot_data::{BotData, Commands, Context};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Discord refuses timeouts longer than 28 days.
const MAX_MUTE_MS: u64 = 28 * 24 * 60 * 60 * 1000;

pub fn register(commands: &mut Commands) {
    commands.register(
        "ban",
        "Ban a member from the server",
        vec![
            Argument::required("user", "The user to ban").kind(ArgumentKind::User),
            Argument::required("reason", "Reason for the ban"),
        ],
        Arc::new(Ban),
    );
    commands.register(
        "kick",
        "Kick a member from the server",
        vec![
            Argument::required("user", "The user to kick").kind(ArgumentKind::User),
            Argument::required("reason", "Reason for the kick"),
        ],
        Arc::new(Kick),
    );
    commands.register(
        "mute",
        "Time out a member for a while",
        vec![
            Argument::required("user", "The user to mute").kind(ArgumentKind::User),
            Argument::required("time", "Duration, e.g. 10m, 1h30m or 2d"),
        ],
        Arc::new(Mute),
    );
}

/// `(user, text)` from the two arguments every moderation command takes.
fn target<'a>(ctx: &'a Context<'_>, text: &str, usage: &str) -> Result<(u64, &'a str), CommandError> {
    let user = ctx.invocation.user("user");
    let text = ctx
        .invocation
        .string(text)
        .map(str::trim)
        .filter(|t| !t.is_empty());

    match (user, text) {
        (Some(user), Some(text)) => Ok((user, text)),
        _ => Err(CommandError::usage(usage)),
    }
}

pub struct Ban;

#[async_trait]
impl CommandHandler<BotData> for Ban {
    async fn handle(&self, ctx: Context<'_>) -> CommandResult {
        ctx.invocation.require_permission(Permission::BanMembers)?;
        let guild_id = ctx.invocation.guild()?;
        let (user_id, reason) = target(&ctx, "reason", "Usage: /ban <user> <reason>")?;

        ctx.data.platform.ban(guild_id, user_id, reason).await?;
        tracing::info!(guild_id, moderator = ctx.invocation.user_id, user_id, "Member banned");

        Ok(Reply::text(format!(
            "User <@{}> has been banned for {}.",
            user_id, reason
        )))
    }
}

pub struct Kick;

#[async_trait]
impl CommandHandler<BotData> for Kick {
    async fn handle(&self, ctx: Context<'_>) -> CommandResult {
        ctx.invocation.require_permission(Permission::KickMembers)?;
        let guild_id = ctx.invocation.guild()?;
        let (user_id, reason) = target(&ctx, "reason", "Usage: /kick <user> <reason>")?;

        ctx.data.platform.kick(guild_id, user_id, reason).await?;
        tracing::info!(guild_id, moderator = ctx.invocation.user_id, user_id, "Member kicked");

        Ok(Reply::text(format!(
            "User <@{}> has been kicked for {}.",
            user_id, reason
        )))
    }
}

pub struct Mute;

#[async_trait]
impl CommandHandler<BotData> for Mute {
    async fn handle(&self, ctx: Context<'_>) -> CommandResult {
        ctx.invocation.require_permission(Permission::ModerateMembers)?;
        let guild_id = ctx.invocation.guild()?;
        let (user_id, time) = target(&ctx, "time", "Usage: /mute <user> <time>")?;

        let millis = resolve_time_string(time);
        if millis == 0 {
            return Err(CommandError::usage(
                "Usage: /mute <user> <time>\nTime is a list of amounts like 30s, 10m, 2h or 1d.",
            ));
        }
        if millis > MAX_MUTE_MS {
            return Err(CommandError::Validation(
                "A mute can last at most 28 days.".to_string(),
            ));
        }

        let until = Utc::now() + Duration::milliseconds(millis as i64);
        ctx.data.platform.timeout_until(guild_id, user_id, until).await?;
        tracing::info!(guild_id, moderator = ctx.invocation.user_id, user_id, %until, "Member muted");

        Ok(Reply::text(format!(
            "User <@{}> has been muted for {}.",
            user_id, time
        )))
    }
}

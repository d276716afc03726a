// Progression commands: `/profile` and `/daily`.

use crate::core::commands::{Argument, ArgumentKind, CommandHandler, CommandResult, EmbedSpec, Reply};
use crate::core::users::{UserService, ROLE_TIERS};
use crate::discord::bot_data::{BotData, Commands, Context};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

const PROFILE_COLOUR: u32 = 0x5865F2;

pub fn register(commands: &mut Commands) {
    commands.register(
        "profile",
        "Show your level, tokens and submissions",
        vec![Argument::optional("user", "User to check (defaults to you)").kind(ArgumentKind::User)],
        Arc::new(Profile),
    );
    commands.register(
        "daily",
        "Claim your daily token reward",
        vec![],
        Arc::new(Daily),
    );
}

pub struct Profile;

#[async_trait]
impl CommandHandler<BotData> for Profile {
    async fn handle(&self, ctx: Context<'_>) -> CommandResult {
        let user_id = ctx.invocation.user("user").unwrap_or(ctx.invocation.user_id);
        let record = ctx.data.users.profile(user_id).await?;

        let role = if record.roles.is_empty() {
            "None".to_string()
        } else {
            record.roles.clone()
        };
        let next_tier = ROLE_TIERS.iter().find(|tier| tier.level > record.level);
        let daily = if UserService::claimed_on(&record, Utc::now()) {
            "Claimed today"
        } else {
            "Available"
        };

        let mut embed = EmbedSpec::new("Profile", format!("<@{}>", user_id))
            .colour(PROFILE_COLOUR)
            .field("Level", format!("**{}**", record.level), true)
            .field("Tokens", format!("**{}**", record.tokens), true)
            .field("Approved submissions", record.submission.to_string(), true)
            .field("Pending submissions", record.submission_pending.to_string(), true)
            .field("Role", role, true)
            .field("Daily reward", daily, true);
        if let Some(tier) = next_tier {
            embed = embed.field(
                "Next role",
                format!("{} at level {}", tier.name, tier.level),
                false,
            );
        }

        Ok(Reply::embed(embed))
    }
}

pub struct Daily;

#[async_trait]
impl CommandHandler<BotData> for Daily {
    async fn handle(&self, ctx: Context<'_>) -> CommandResult {
        let claim = ctx
            .data
            .users
            .claim_daily(ctx.invocation.user_id, Utc::now())
            .await?;

        Ok(Reply::text(format!(
            "You claimed your daily reward of {} tokens! You now have {} tokens.",
            claim.tokens_awarded, claim.new_balance
        )))
    }
}

#[cfg(test)]
mod tests {
    use crate::core::commands::{OptionValue, Reply};
    use crate::discord::commands::test_support::{member, Harness, MODERATOR};

    fn field<'a>(reply: &'a Reply, name: &str) -> &'a str {
        reply
            .embed
            .as_ref()
            .and_then(|e| e.fields.iter().find(|(n, _, _)| n == name))
            .map(|(_, value, _)| value.as_str())
            .unwrap_or_else(|| panic!("missing field {}", name))
    }

    #[tokio::test]
    async fn profile_shows_default_record_for_new_user() {
        let harness = Harness::new().await;
        let reply = harness.run(member("profile")).await;

        assert_eq!(field(&reply, "Level"), "**1**");
        assert_eq!(field(&reply, "Tokens"), "**0**");
        assert_eq!(field(&reply, "Role"), "None");
        assert_eq!(field(&reply, "Daily reward"), "Available");
        assert_eq!(field(&reply, "Next role"), "<☆Ordinary> at level 5");
    }

    #[tokio::test]
    async fn profile_of_another_user() {
        let harness = Harness::new().await;
        let reply = harness
            .run(member("profile").with_option("user", OptionValue::User(MODERATOR)))
            .await;
        assert_eq!(
            reply.embed.as_ref().unwrap().description,
            format!("<@{}>", MODERATOR)
        );
    }

    #[tokio::test]
    async fn daily_is_claimable_once_per_day() {
        let harness = Harness::new().await;

        let first = harness.run(member("daily")).await;
        assert_eq!(
            first.content,
            "You claimed your daily reward of 10 tokens! You now have 10 tokens."
        );

        let second = harness.run(member("daily")).await;
        assert!(second.ephemeral);
        assert!(second.content.contains("already claimed"));

        let reply = harness.run(member("profile")).await;
        assert_eq!(field(&reply, "Tokens"), "**10**");
        assert_eq!(field(&reply, "Daily reward"), "Claimed today");
    }
}

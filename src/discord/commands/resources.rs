// Resource catalog commands.
//
// Members submit links with `/addresource`; moderators review them with
// `/pendingresources` and `/approveresource`. Approved entries show up in
// `/resources` next to the built-in links.

use crate::core::commands::{
    Argument, ArgumentKind, CommandError, CommandHandler, CommandResult, EmbedSpec, Permission,
    Reply,
};
use crate::core::users::sync_level_role;
use crate::discord::bot_data::{BotData, Commands, Context};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

/// Embeds hold at most 25 fields.
const MAX_PENDING_SHOWN: usize = 25;
/// Discord rejects message content longer than this.
const MAX_CONTENT_CHARS: usize = 2000;

pub fn register(commands: &mut Commands) {
    commands.register(
        "resources",
        "Get learning resources for a topic",
        vec![Argument::optional("topic", "The topic to get resources for")],
        Arc::new(Resources),
    );
    commands.register(
        "addresource",
        "Submit a learning resource for review",
        vec![
            Argument::required("subject", "The subject, e.g. TypeScript or C#"),
            Argument::required("topic", "The topic, e.g. General or Interfaces"),
            Argument::required("description", "Short description of what the resource explains"),
            Argument::required("link", "URL of the resource"),
        ],
        Arc::new(AddResource),
    );
    commands.register(
        "pendingresources",
        "List submitted resources waiting for approval",
        vec![],
        Arc::new(PendingResources),
    );
    commands.register(
        "approveresource",
        "Approve a submitted resource",
        vec![Argument::required("id", "Id of the resource to approve").kind(ArgumentKind::Integer)],
        Arc::new(ApproveResource),
    );
    // Role sync makes several API calls before the reply is ready.
    commands.set_deferred("approveresource");
}

pub struct Resources;

#[async_trait]
impl CommandHandler<BotData> for Resources {
    async fn handle(&self, ctx: Context<'_>) -> CommandResult {
        let Some(topic) = ctx
            .invocation
            .string("topic")
            .map(str::trim)
            .filter(|t| !t.is_empty())
        else {
            return Err(CommandError::usage("Usage: /resources <topic>"));
        };

        let found = ctx.data.resources.search(topic).await?;
        if found.is_empty() {
            return Ok(Reply::text(format!("No resources found for {}", topic)));
        }

        let lines: Vec<String> = found
            .builtin
            .iter()
            .map(|link| link.to_string())
            .chain(found.catalog.iter().map(|r| {
                format!("{} / {}: {} <{}>", r.subject, r.topic, r.description, r.link)
            }))
            .collect();

        Ok(Reply::text(resource_listing(topic, &lines)))
    }
}

/// `Here are some resources for X:` followed by as many lines as fit in one
/// message. Lines that do not fit are summarised as `...and N more.`
fn resource_listing(topic: &str, lines: &[String]) -> String {
    let mut text = format!("Here are some resources for {}: ", topic);
    let mut used = text.chars().count();

    for (shown, line) in lines.iter().enumerate() {
        let more = format!("\n  ...and {} more.", lines.len() - shown);
        let entry = line.chars().count() + 3;
        if used + entry + more.chars().count() > MAX_CONTENT_CHARS {
            text.push_str(&more);
            return text;
        }
        text.push_str("\n  ");
        text.push_str(line);
        used += entry;
    }
    text
}

pub struct AddResource;

#[async_trait]
impl CommandHandler<BotData> for AddResource {
    async fn handle(&self, ctx: Context<'_>) -> CommandResult {
        let inv = ctx.invocation;
        let arg = |name: &str| inv.string(name).unwrap_or_default();

        let resource = ctx
            .data
            .resources
            .submit(
                inv.user_id,
                arg("subject"),
                arg("topic"),
                arg("description"),
                arg("link"),
                Utc::now(),
            )
            .await?;

        // Already stored, so a failed counter update is only logged.
        if let Err(err) = ctx.data.users.record_pending_submission(inv.user_id).await {
            tracing::warn!(user_id = inv.user_id, "Failed to count pending submission: {}", err);
        }

        Ok(Reply::ephemeral(format!(
            "Thanks! Your resource **{} / {}** was submitted for review (id {}).",
            resource.subject, resource.topic, resource.id
        )))
    }
}

pub struct PendingResources;

#[async_trait]
impl CommandHandler<BotData> for PendingResources {
    async fn handle(&self, ctx: Context<'_>) -> CommandResult {
        ctx.invocation.require_permission(Permission::ManageMessages)?;

        let pending = ctx.data.resources.pending().await?;
        if pending.is_empty() {
            return Ok(Reply::ephemeral("No resources are waiting for approval."));
        }

        let description = if pending.len() > MAX_PENDING_SHOWN {
            format!("Showing {} of {}.", MAX_PENDING_SHOWN, pending.len())
        } else {
            String::new()
        };

        let embed = pending.iter().take(MAX_PENDING_SHOWN).fold(
            EmbedSpec::new("Pending resources", description),
            |embed, r| {
                embed.field(
                    format!("#{} {} / {}", r.id, r.subject, r.topic),
                    format!("{}\n{}\nSubmitted by <@{}>", r.description, r.link, r.added_by),
                    false,
                )
            },
        );

        Ok(Reply {
            ephemeral: true,
            ..Reply::embed(embed)
        })
    }
}

pub struct ApproveResource;

#[async_trait]
impl CommandHandler<BotData> for ApproveResource {
    async fn handle(&self, ctx: Context<'_>) -> CommandResult {
        let inv = ctx.invocation;
        inv.require_permission(Permission::ManageMessages)?;
        let id = inv
            .integer("id")
            .ok_or_else(|| CommandError::usage("Usage: /approveresource <id>"))?;

        let data = ctx.data;
        let resource = data.resources.approve(id, inv.user_id).await?;

        let Some(submitter) = resource.added_by_id() else {
            tracing::warn!(id, added_by = %resource.added_by, "Approved resource has no valid submitter id");
            return Ok(Reply::text(format!("Resource #{} approved.", id)));
        };

        let level_change = data.users.record_approved_submission(submitter).await?;
        let mut text = format!(
            "Resource #{} approved. <@{}> earned {} tokens.",
            id,
            submitter,
            data.users.config().submission_reward
        );
        if let Some(change) = &level_change {
            text.push_str(&format!(" They are now level {}.", change.new_level));
        }

        if let Some(guild_id) = inv.guild_id {
            if let Err(err) =
                sync_level_role(&data.users, data.platform.as_ref(), guild_id, inv.channel_id, submitter).await
            {
                tracing::warn!(guild_id, user_id = submitter, "Level role sync failed: {}", err);
            }
        }

        Ok(Reply::text(text))
    }
}

#[cfg(test)]
mod tests {
    use crate::core::commands::{OptionValue, Permission};
    use crate::core::platform::recording::PlatformCall;
    use crate::discord::commands::test_support::{member, moderator, Harness, MEMBER};

    async fn submit(harness: &Harness, subject: &str, link: &str) -> String {
        let invocation = member("addresource")
            .with_option("subject", OptionValue::String(subject.into()))
            .with_option("topic", OptionValue::String("General".into()))
            .with_option("description", OptionValue::String("A good intro".into()))
            .with_option("link", OptionValue::String(link.into()));
        harness.run(invocation).await.content
    }

    #[tokio::test]
    async fn resources_without_topic_shows_usage() {
        let harness = Harness::new().await;
        let reply = harness.run(member("resources")).await;
        assert_eq!(reply.content, "Usage: /resources <topic>");
    }

    #[tokio::test]
    async fn builtin_links_are_listed() {
        let harness = Harness::new().await;
        let reply = harness
            .run(member("resources").with_option("topic", OptionValue::String("TypeScript".into())))
            .await;
        assert_eq!(
            reply.content,
            "Here are some resources for TypeScript: \n  https://www.typescriptlang.org/docs/"
        );

        let reply = harness
            .run(member("resources").with_option("topic", OptionValue::String("cobol".into())))
            .await;
        assert_eq!(reply.content, "No resources found for cobol");
    }

    #[tokio::test]
    async fn submission_counts_as_pending_and_is_hidden_until_approved() {
        let harness = Harness::new().await;
        let reply = submit(&harness, "Rust", "https://doc.rust-lang.org/book/").await;
        assert!(reply.contains("submitted for review (id 1)"), "{}", reply);

        let record = harness.data().users.profile(MEMBER).await.unwrap();
        assert_eq!(record.submission_pending, 1);

        let reply = harness
            .run(member("resources").with_option("topic", OptionValue::String("rust".into())))
            .await;
        assert_eq!(reply.content, "No resources found for rust");
    }

    #[tokio::test]
    async fn invalid_link_is_rejected() {
        let harness = Harness::new().await;
        let reply = submit(&harness, "Rust", "ftp://example.com/book").await;
        assert_eq!(reply, "Link must be a valid http(s) URL.");

        let record = harness.data().users.profile(MEMBER).await.unwrap();
        assert_eq!(record.submission_pending, 0);
    }

    #[tokio::test]
    async fn pending_list_requires_manage_messages() {
        let harness = Harness::new().await;
        submit(&harness, "Rust", "https://doc.rust-lang.org/book/").await;

        let reply = harness.run(member("pendingresources")).await;
        assert_eq!(reply.content, "You do not have permission to use this command.");

        let reply = harness
            .run(moderator("pendingresources", Permission::ManageMessages))
            .await;
        let embed = reply.embed.expect("embed");
        assert_eq!(embed.fields.len(), 1);
        assert_eq!(embed.fields[0].0, "#1 Rust / General");
        assert!(reply.ephemeral);
    }

    #[tokio::test]
    async fn approval_rewards_submitter_and_publishes_resource() {
        let harness = Harness::new().await;
        submit(&harness, "Rust", "https://doc.rust-lang.org/book/").await;

        let reply = harness
            .run(
                moderator("approveresource", Permission::ManageMessages)
                    .with_option("id", OptionValue::Integer(1)),
            )
            .await;
        assert_eq!(
            reply.content,
            format!("Resource #1 approved. <@{}> earned 5 tokens. They are now level 2.", MEMBER)
        );

        let record = harness.data().users.profile(MEMBER).await.unwrap();
        assert_eq!(record.submission_pending, 0);
        assert_eq!(record.submission, 1);
        assert_eq!(record.tokens, 5);
        assert_eq!(record.level, 2);

        // Level 2 is below the first tier, so no role is touched.
        assert!(!harness
            .platform
            .calls()
            .iter()
            .any(|c| matches!(c, PlatformCall::AssignRole { .. })));

        let reply = harness
            .run(member("resources").with_option("topic", OptionValue::String("rust".into())))
            .await;
        assert!(reply.content.contains("Rust / General: A good intro <https://doc.rust-lang.org/book/>"));
    }

    #[tokio::test]
    async fn approving_twice_or_unknown_id_is_refused() {
        let harness = Harness::new().await;
        submit(&harness, "Rust", "https://doc.rust-lang.org/book/").await;

        let approve = |id| {
            moderator("approveresource", Permission::ManageMessages)
                .with_option("id", OptionValue::Integer(id))
        };
        harness.run(approve(1)).await;

        let again = harness.run(approve(1)).await;
        assert!(again.ephemeral);
        assert!(again.content.contains("already approved"), "{}", again.content);

        let missing = harness.run(approve(99)).await;
        assert!(missing.ephemeral);
        assert!(missing.content.contains("99"), "{}", missing.content);
    }

    #[tokio::test]
    async fn long_listing_fits_in_one_message() {
        let harness = Harness::new().await;
        let description = "Covers ownership and borrowing ".repeat(4);
        for i in 1..=20 {
            let invocation = member("addresource")
                .with_option("subject", OptionValue::String("Rust".into()))
                .with_option("topic", OptionValue::String("General".into()))
                .with_option("description", OptionValue::String(description[..100].into()))
                .with_option(
                    "link",
                    OptionValue::String(format!("https://example.com/{}/{}", "x".repeat(80), i)),
                );
            harness.run(invocation).await;
            harness
                .run(
                    moderator("approveresource", Permission::ManageMessages)
                        .with_option("id", OptionValue::Integer(i)),
                )
                .await;
        }

        let reply = harness
            .run(member("resources").with_option("topic", OptionValue::String("rust".into())))
            .await;
        assert!(reply.content.chars().count() <= 2000, "{}", reply.content.len());
        assert!(reply.content.starts_with("Here are some resources for rust: "));
        assert!(reply.content.ends_with("more."), "{}", reply.content);
    }

    #[test]
    fn short_listing_is_not_truncated() {
        let lines = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            super::resource_listing("x", &lines),
            "Here are some resources for x: \n  a\n  b"
        );
    }

    #[tokio::test]
    async fn reaching_level_five_awards_first_tier_role() {
        let harness = Harness::new().await;
        for i in 1..=4 {
            submit(&harness, "Rust", &format!("https://example.com/{}", i)).await;
            harness
                .run(
                    moderator("approveresource", Permission::ManageMessages)
                        .with_option("id", OptionValue::Integer(i)),
                )
                .await;
        }

        let roles: Vec<String> = harness
            .platform
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                PlatformCall::AssignRole { role, .. } => Some(role),
                _ => None,
            })
            .collect();
        assert_eq!(roles, vec!["<☆Ordinary>".to_string()]);

        let record = harness.data().users.profile(MEMBER).await.unwrap();
        assert_eq!(record.level, 5);
        assert_eq!(record.roles, "<☆Ordinary>");
    }
}

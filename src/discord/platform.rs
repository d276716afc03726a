// serenity implementation of the `ChatPlatform` port.

use super::convert::{create_message, edit_message};
use crate::core::platform::{ChatPlatform, OutboundMessage, PlatformError, MISSING_PERMISSIONS_CODE};
use crate::core::users::RoleTier;
use crate::infra::http::WebClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serenity::all::{
    ChannelId, EditMember, EditMessage, EditRole, GuildId, Http, MessageId, Permissions, RoleId,
    Timestamp, UserId,
};
use serenity::http::HttpError;
use std::sync::Arc;

pub struct SerenityPlatform {
    http: Arc<Http>,
    web: Arc<WebClient>,
}

impl SerenityPlatform {
    pub fn new(http: Arc<Http>, web: Arc<WebClient>) -> Self {
        Self { http, web }
    }
}

/// Classify a serenity failure. `what` names the target for not-found errors.
fn map_err(what: &str, err: serenity::Error) -> PlatformError {
    if let serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) = &err {
        if response.error.code == MISSING_PERMISSIONS_CODE {
            return PlatformError::BotLacksPermission;
        }
        if response.status_code.as_u16() == 404 {
            return PlatformError::NotFound(what.to_string());
        }
    }
    PlatformError::Request(err.to_string())
}

#[async_trait]
impl ChatPlatform for SerenityPlatform {
    async fn ban(&self, guild_id: u64, user_id: u64, reason: &str) -> Result<(), PlatformError> {
        GuildId::new(guild_id)
            .ban_with_reason(&self.http, UserId::new(user_id), 0, reason)
            .await
            .map_err(|e| map_err("that member", e))
    }

    async fn kick(&self, guild_id: u64, user_id: u64, reason: &str) -> Result<(), PlatformError> {
        GuildId::new(guild_id)
            .kick_with_reason(&self.http, UserId::new(user_id), reason)
            .await
            .map_err(|e| map_err("that member", e))
    }

    async fn timeout_until(
        &self,
        guild_id: u64,
        user_id: u64,
        until: DateTime<Utc>,
    ) -> Result<(), PlatformError> {
        let until = Timestamp::from_unix_timestamp(until.timestamp())
            .map_err(|e| PlatformError::Request(format!("invalid timeout end: {}", e)))?;

        GuildId::new(guild_id)
            .edit_member(
                &self.http,
                UserId::new(user_id),
                EditMember::new().disable_communication_until_datetime(until),
            )
            .await
            .map(|_| ())
            .map_err(|e| map_err("that member", e))
    }

    async fn send_message(&self, channel_id: u64, message: OutboundMessage) -> Result<u64, PlatformError> {
        ChannelId::new(channel_id)
            .send_message(&self.http, create_message(channel_id, &message))
            .await
            .map(|sent| sent.id.get())
            .map_err(|e| map_err("that channel", e))
    }

    async fn edit_message(
        &self,
        channel_id: u64,
        message_id: u64,
        message: OutboundMessage,
    ) -> Result<(), PlatformError> {
        ChannelId::new(channel_id)
            .edit_message(&self.http, MessageId::new(message_id), edit_message(&message))
            .await
            .map(|_| ())
            .map_err(|e| map_err("that message", e))
    }

    async fn edit_message_content(
        &self,
        channel_id: u64,
        message_id: u64,
        content: &str,
    ) -> Result<(), PlatformError> {
        ChannelId::new(channel_id)
            .edit_message(
                &self.http,
                MessageId::new(message_id),
                EditMessage::new().content(content),
            )
            .await
            .map(|_| ())
            .map_err(|e| map_err("that message", e))
    }

    async fn fetch_attachment_text(&self, url: &str) -> Result<String, PlatformError> {
        self.web.fetch_text(url).await
    }

    async fn assign_tier_role(
        &self,
        guild_id: u64,
        user_id: u64,
        tier: &RoleTier,
        all_tiers: &[RoleTier],
    ) -> Result<(), PlatformError> {
        let guild = GuildId::new(guild_id);
        let existing = guild
            .roles(&self.http)
            .await
            .map_err(|e| map_err("that server", e))?;

        // Tier roles are matched by name; create whichever are missing.
        let mut tier_roles: Vec<(&str, RoleId)> = Vec::new();
        for t in all_tiers {
            let found = existing
                .values()
                .find(|role| role.name == t.name)
                .map(|role| role.id);
            let role_id = match found {
                Some(id) => id,
                None => {
                    let mut builder = EditRole::new().name(t.name).permissions(Permissions::empty());
                    if let Some(colour) = t.colour {
                        builder = builder.colour(colour);
                    }
                    let created = guild
                        .create_role(&self.http, builder)
                        .await
                        .map_err(|e| map_err("that server", e))?;
                    tracing::info!(guild_id, role = t.name, "Created level role");
                    created.id
                }
            };
            tier_roles.push((t.name, role_id));
        }

        let Some(&(_, target)) = tier_roles.iter().find(|(name, _)| *name == tier.name) else {
            return Err(PlatformError::NotFound(format!("role {}", tier.name)));
        };

        let member = guild
            .member(&self.http, UserId::new(user_id))
            .await
            .map_err(|e| map_err("that member", e))?;

        let stale: Vec<RoleId> = tier_roles
            .iter()
            .map(|(_, id)| *id)
            .filter(|id| *id != target && member.roles.contains(id))
            .collect();
        if !stale.is_empty() {
            member
                .remove_roles(&self.http, &stale)
                .await
                .map_err(|e| map_err("that member", e))?;
        }

        member
            .add_role(&self.http, target)
            .await
            .map_err(|e| map_err("that member", e))
    }
}

// Outbound side of the chat platform: the actions command handlers need to
// take beyond replying to the interaction itself.
//
// The discord layer implements this with serenity. Tests use a recording fake.

use crate::core::commands::{CommandError, EmbedSpec};
use crate::core::users::RoleTier;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Discord's "Missing Permissions" JSON error code.
pub const MISSING_PERMISSIONS_CODE: isize = 50013;

#[derive(Debug, Error)]
pub enum PlatformError {
    /// The bot's own role lacks a permission needed for the action.
    #[error("bot is missing permissions for this action")]
    BotLacksPermission,

    #[error("target not found: {0}")]
    NotFound(String),

    #[error("platform request failed: {0}")]
    Request(String),
}

impl From<PlatformError> for CommandError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::BotLacksPermission => CommandError::Validation(
                "I don't have permission to do that. Please adjust my permissions or move my role higher."
                    .to_string(),
            ),
            PlatformError::NotFound(what) => CommandError::Validation(format!("Could not find {}.", what)),
            PlatformError::Request(detail) => CommandError::Io(detail),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

/// A string select menu attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectMenuSpec {
    pub custom_id: String,
    pub placeholder: String,
    pub min_values: u8,
    pub max_values: u8,
    pub options: Vec<SelectOption>,
}

/// A message to post into (or replace in) a channel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutboundMessage {
    pub content: String,
    pub embed: Option<EmbedSpec>,
    pub select_menu: Option<SelectMenuSpec>,
    /// Reply to this message id in the same channel.
    pub reply_to: Option<u64>,
}

impl OutboundMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn embed(embed: EmbedSpec) -> Self {
        Self {
            embed: Some(embed),
            ..Default::default()
        }
    }

    pub fn with_select_menu(mut self, menu: SelectMenuSpec) -> Self {
        self.select_menu = Some(menu);
        self
    }

    pub fn replying_to(mut self, message_id: u64) -> Self {
        self.reply_to = Some(message_id);
        self
    }
}

#[async_trait]
pub trait ChatPlatform: Send + Sync {
    async fn ban(&self, guild_id: u64, user_id: u64, reason: &str) -> Result<(), PlatformError>;

    async fn kick(&self, guild_id: u64, user_id: u64, reason: &str) -> Result<(), PlatformError>;

    /// Prevent the member from talking until `until`.
    async fn timeout_until(
        &self,
        guild_id: u64,
        user_id: u64,
        until: DateTime<Utc>,
    ) -> Result<(), PlatformError>;

    /// Post a message and return its id.
    async fn send_message(&self, channel_id: u64, message: OutboundMessage) -> Result<u64, PlatformError>;

    /// Replace the content, embed and components of a message we posted.
    /// A `None` embed or select menu clears it.
    async fn edit_message(
        &self,
        channel_id: u64,
        message_id: u64,
        message: OutboundMessage,
    ) -> Result<(), PlatformError>;

    /// Change only the text of a message, keeping its embed and components.
    async fn edit_message_content(
        &self,
        channel_id: u64,
        message_id: u64,
        content: &str,
    ) -> Result<(), PlatformError>;

    /// Download an uploaded attachment as text.
    async fn fetch_attachment_text(&self, url: &str) -> Result<String, PlatformError>;

    /// Make `tier` the member's only level-tier role, creating any missing
    /// tier roles in the guild first.
    async fn assign_tier_role(
        &self,
        guild_id: u64,
        user_id: u64,
        tier: &RoleTier,
        all_tiers: &[RoleTier],
    ) -> Result<(), PlatformError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_bot_permission_is_reported_as_fixable() {
        let err: CommandError = PlatformError::BotLacksPermission.into();
        assert!(matches!(err, CommandError::Validation(_)));
        assert!(err.user_message().contains("permission"));
    }

    #[test]
    fn request_failures_are_io() {
        let err: CommandError = PlatformError::Request("HTTP 502".into()).into();
        assert!(matches!(err, CommandError::Io(_)));
        assert!(!err.user_message().contains("502"));
    }

    #[test]
    fn outbound_builders() {
        let message = OutboundMessage::text("hi").replying_to(9);
        assert_eq!(message.reply_to, Some(9));
        assert!(message.select_menu.is_none());
    }
}

// Test double for `ChatPlatform` that records every call.

use super::platform_port::{ChatPlatform, OutboundMessage, PlatformError};
use crate::core::users::RoleTier;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCall {
    Ban { guild_id: u64, user_id: u64, reason: String },
    Kick { guild_id: u64, user_id: u64, reason: String },
    Timeout { guild_id: u64, user_id: u64, until: DateTime<Utc> },
    Send { channel_id: u64, message_id: u64, message: OutboundMessage },
    Edit { channel_id: u64, message_id: u64, message: OutboundMessage },
    EditContent { channel_id: u64, message_id: u64, content: String },
    AssignRole { guild_id: u64, user_id: u64, role: String },
}

pub struct RecordingPlatform {
    calls: Mutex<Vec<PlatformCall>>,
    attachments: Mutex<HashMap<String, String>>,
    next_message_id: AtomicU64,
    deny_moderation: AtomicBool,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            attachments: Mutex::new(HashMap::new()),
            next_message_id: AtomicU64::new(1000),
            deny_moderation: AtomicBool::new(false),
        }
    }

    /// Serve `body` when `url` is fetched as an attachment.
    pub fn with_attachment(self, url: &str, body: &str) -> Self {
        self.attachments
            .lock()
            .unwrap()
            .insert(url.to_string(), body.to_string());
        self
    }

    /// Make ban/kick/timeout/role calls fail as if the bot lacked permission.
    pub fn denying_moderation(self) -> Self {
        self.deny_moderation.store(true, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::Send { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: PlatformCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn moderation(&self, call: PlatformCall) -> Result<(), PlatformError> {
        if self.deny_moderation.load(Ordering::SeqCst) {
            return Err(PlatformError::BotLacksPermission);
        }
        self.record(call);
        Ok(())
    }
}

#[async_trait]
impl ChatPlatform for RecordingPlatform {
    async fn ban(&self, guild_id: u64, user_id: u64, reason: &str) -> Result<(), PlatformError> {
        self.moderation(PlatformCall::Ban {
            guild_id,
            user_id,
            reason: reason.to_string(),
        })
    }

    async fn kick(&self, guild_id: u64, user_id: u64, reason: &str) -> Result<(), PlatformError> {
        self.moderation(PlatformCall::Kick {
            guild_id,
            user_id,
            reason: reason.to_string(),
        })
    }

    async fn timeout_until(
        &self,
        guild_id: u64,
        user_id: u64,
        until: DateTime<Utc>,
    ) -> Result<(), PlatformError> {
        self.moderation(PlatformCall::Timeout {
            guild_id,
            user_id,
            until,
        })
    }

    async fn send_message(&self, channel_id: u64, message: OutboundMessage) -> Result<u64, PlatformError> {
        let message_id = self.next_message_id.fetch_add(1, Ordering::SeqCst);
        self.record(PlatformCall::Send {
            channel_id,
            message_id,
            message,
        });
        Ok(message_id)
    }

    async fn edit_message(
        &self,
        channel_id: u64,
        message_id: u64,
        message: OutboundMessage,
    ) -> Result<(), PlatformError> {
        self.record(PlatformCall::Edit {
            channel_id,
            message_id,
            message,
        });
        Ok(())
    }

    async fn edit_message_content(
        &self,
        channel_id: u64,
        message_id: u64,
        content: &str,
    ) -> Result<(), PlatformError> {
        self.record(PlatformCall::EditContent {
            channel_id,
            message_id,
            content: content.to_string(),
        });
        Ok(())
    }

    async fn fetch_attachment_text(&self, url: &str) -> Result<String, PlatformError> {
        self.attachments
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| PlatformError::Request(format!("HTTP 404 for {}", url)))
    }

    async fn assign_tier_role(
        &self,
        guild_id: u64,
        user_id: u64,
        tier: &RoleTier,
        _all_tiers: &[RoleTier],
    ) -> Result<(), PlatformError> {
        self.moderation(PlatformCall::AssignRole {
            guild_id,
            user_id,
            role: tier.name.to_string(),
        })
    }
}

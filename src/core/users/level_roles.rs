// Level-tier roles: a fixed ladder of decorative guild roles awarded as a
// user's level grows.

use super::user_service::UserService;
use crate::core::commands::{CommandError, EmbedSpec};
use crate::core::platform::{ChatPlatform, OutboundMessage, PlatformError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleTier {
    /// Minimum level for this tier.
    pub level: i64,
    pub name: &'static str,
    pub colour: Option<u32>,
}

/// Ascending by level.
pub const ROLE_TIERS: [RoleTier; 6] = [
    RoleTier { level: 5, name: "<☆Ordinary>", colour: None },
    RoleTier { level: 10, name: "<✷Notable>", colour: Some(0x33FF57) },
    RoleTier { level: 15, name: "<✿Exceptional>", colour: Some(0x506BE6) },
    RoleTier { level: 25, name: "<ᕙElite>", colour: Some(0xE4BC42) },
    RoleTier { level: 35, name: "<๑Prestigious๑>", colour: Some(0xE54CED) },
    RoleTier { level: 50, name: "<ミCelestialミ>", colour: Some(0x51EAEF) },
];

const CONGRATULATION_COLOUR: u32 = 0x29EF9E;

/// Highest tier whose threshold `level` meets, if any.
pub fn tier_for_level(level: i64) -> Option<&'static RoleTier> {
    ROLE_TIERS.iter().rev().find(|tier| level >= tier.level)
}

/// Bring the member's tier role in line with their stored level.
///
/// Returns the newly awarded tier. When the bot cannot manage roles a notice
/// is posted to `channel_id` instead and nothing is awarded.
pub async fn sync_level_role(
    users: &UserService,
    platform: &dyn ChatPlatform,
    guild_id: u64,
    channel_id: u64,
    user_id: u64,
) -> Result<Option<&'static RoleTier>, CommandError> {
    let record = users.profile(user_id).await?;
    let Some(tier) = tier_for_level(record.level) else {
        return Ok(None);
    };
    if record.roles == tier.name {
        return Ok(None);
    }

    match platform
        .assign_tier_role(guild_id, user_id, tier, &ROLE_TIERS)
        .await
    {
        Ok(()) => {}
        Err(PlatformError::BotLacksPermission) => {
            tracing::warn!(guild_id, user_id, role = tier.name, "Bot lacks permission to manage roles");
            platform
                .send_message(
                    channel_id,
                    OutboundMessage::text(
                        "I don't have permission to manage roles. Please adjust my permissions or move my role higher.",
                    ),
                )
                .await?;
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    }

    users.set_role(user_id, tier.name).await?;
    tracing::info!(guild_id, user_id, role = tier.name, "Awarded level role");

    let embed = EmbedSpec::new(
        format!("💫 Congratulations! 🎉 **<@{}>**  💫", user_id),
        format!(
            "🌟✨  You have been awarded a new role: **{}** 🎖️. Keep up the great work! 🚀",
            tier.name
        ),
    )
    .colour(CONGRATULATION_COLOUR);
    platform
        .send_message(channel_id, OutboundMessage::embed(embed))
        .await?;

    Ok(Some(tier))
}

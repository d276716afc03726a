// Translation between serenity types and the platform-agnostic command types.
//
// Inbound: interactions become `CommandInvocation` / `ComponentEvent`.
// Outbound: `Reply` and `OutboundMessage` become serenity builders.

use crate::core::commands::{
    CommandInvocation, ComponentEvent, EmbedSpec, OptionValue, Permission, Reply,
};
use crate::core::platform::{OutboundMessage, SelectMenuSpec};
use serenity::all::{
    ChannelId, CommandInteraction, ComponentInteraction, ComponentInteractionDataKind,
    CreateActionRow, CreateEmbed, CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, CreateMessage, CreateSelectMenu, CreateSelectMenuKind,
    CreateSelectMenuOption, EditInteractionResponse, EditMessage, MessageId, Permissions,
    ResolvedValue,
};

// ============================================================================
// INBOUND
// ============================================================================

pub fn invocation_from(cmd: &CommandInteraction) -> CommandInvocation {
    let mut invocation =
        CommandInvocation::new(cmd.data.name.clone(), cmd.user.id.get(), cmd.channel_id.get());
    invocation.user_name = cmd.user.name.clone();
    invocation.guild_id = cmd.guild_id.map(|id| id.get());

    for option in cmd.data.options() {
        if let Some(value) = option_value(&option.value) {
            invocation.options.insert(option.name.to_string(), value);
        }
    }

    if let Some(permissions) = cmd.member.as_ref().and_then(|m| m.permissions) {
        invocation.permissions = permissions_from(permissions);
    }

    invocation
}

fn option_value(value: &ResolvedValue<'_>) -> Option<OptionValue> {
    match value {
        ResolvedValue::String(s) => Some(OptionValue::String(s.to_string())),
        ResolvedValue::Integer(i) => Some(OptionValue::Integer(*i)),
        ResolvedValue::Boolean(b) => Some(OptionValue::Boolean(*b)),
        ResolvedValue::User(user, _) => Some(OptionValue::User(user.id.get())),
        ResolvedValue::Channel(channel) => Some(OptionValue::Channel(channel.id.get())),
        ResolvedValue::Role(role) => Some(OptionValue::Role(role.id.get())),
        ResolvedValue::Attachment(attachment) => Some(OptionValue::Attachment {
            url: attachment.url.clone(),
            filename: attachment.filename.clone(),
        }),
        _ => None,
    }
}

/// The subset of guild permissions our commands check.
pub fn permissions_from(permissions: Permissions) -> Vec<Permission> {
    [
        (permissions.administrator(), Permission::Administrator),
        (permissions.ban_members(), Permission::BanMembers),
        (permissions.kick_members(), Permission::KickMembers),
        (permissions.moderate_members(), Permission::ModerateMembers),
        (permissions.manage_messages(), Permission::ManageMessages),
    ]
    .into_iter()
    .filter_map(|(granted, permission)| granted.then_some(permission))
    .collect()
}

pub fn component_event_from(component: &ComponentInteraction) -> ComponentEvent {
    let values = match &component.data.kind {
        ComponentInteractionDataKind::StringSelect { values } => values.clone(),
        _ => Vec::new(),
    };

    ComponentEvent {
        custom_id: component.data.custom_id.clone(),
        user_id: component.user.id.get(),
        guild_id: component.guild_id.map(|id| id.get()),
        channel_id: component.channel_id.get(),
        message_id: component.message.id.get(),
        values,
    }
}

// ============================================================================
// OUTBOUND
// ============================================================================

pub fn create_embed(spec: &EmbedSpec) -> CreateEmbed {
    let mut embed = CreateEmbed::new().title(&spec.title);
    if !spec.description.is_empty() {
        embed = embed.description(&spec.description);
    }
    if let Some(colour) = spec.colour {
        embed = embed.colour(colour);
    }
    for (name, value, inline) in &spec.fields {
        embed = embed.field(name, value, *inline);
    }
    embed
}

pub fn interaction_response(reply: &Reply) -> CreateInteractionResponse {
    let mut message = CreateInteractionResponseMessage::new().ephemeral(reply.ephemeral);
    if !reply.content.is_empty() {
        message = message.content(&reply.content);
    }
    if let Some(embed) = &reply.embed {
        message = message.embed(create_embed(embed));
    }
    CreateInteractionResponse::Message(message)
}

/// Fills in the public placeholder left by a deferred command.
pub fn edit_interaction_response(reply: &Reply) -> EditInteractionResponse {
    EditInteractionResponse::new()
        .content(&reply.content)
        .embeds(reply.embed.iter().map(create_embed).collect())
}

/// Private follow-up for an ephemeral reply to a deferred command.
pub fn followup_message(reply: &Reply) -> CreateInteractionResponseFollowup {
    let mut followup = CreateInteractionResponseFollowup::new().ephemeral(reply.ephemeral);
    if !reply.content.is_empty() {
        followup = followup.content(&reply.content);
    }
    if let Some(embed) = &reply.embed {
        followup = followup.embed(create_embed(embed));
    }
    followup
}

fn select_menu_row(spec: &SelectMenuSpec) -> CreateActionRow {
    let options = spec
        .options
        .iter()
        .map(|option| CreateSelectMenuOption::new(&option.label, &option.value))
        .collect();

    CreateActionRow::SelectMenu(
        CreateSelectMenu::new(&spec.custom_id, CreateSelectMenuKind::String { options })
            .placeholder(&spec.placeholder)
            .min_values(spec.min_values)
            .max_values(spec.max_values),
    )
}

pub fn create_message(channel_id: u64, message: &OutboundMessage) -> CreateMessage {
    let mut builder = CreateMessage::new();
    if !message.content.is_empty() {
        builder = builder.content(&message.content);
    }
    if let Some(embed) = &message.embed {
        builder = builder.embed(create_embed(embed));
    }
    if let Some(menu) = &message.select_menu {
        builder = builder.components(vec![select_menu_row(menu)]);
    }
    if let Some(reply_to) = message.reply_to {
        builder = builder.reference_message((ChannelId::new(channel_id), MessageId::new(reply_to)));
    }
    builder
}

/// Full replacement: absent embed or menu clears the existing one.
pub fn edit_message(message: &OutboundMessage) -> EditMessage {
    let embeds = message.embed.iter().map(create_embed).collect();
    let components = message.select_menu.iter().map(select_menu_row).collect();

    EditMessage::new()
        .content(&message.content)
        .embeds(embeds)
        .components(components)
}

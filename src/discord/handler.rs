// Gateway event handler: the outer edge of the dispatch loop.
//
// Interactions are converted into platform-agnostic events, routed by the
// dispatcher, and the resulting reply is sent back as the interaction
// response. Commands marked deferred are acknowledged first and answered by
// editing the placeholder. Plain guild messages go through the link scanner
// instead.

use super::bot_data::BotDispatcher;
use super::convert::{
    component_event_from, edit_interaction_response, followup_message, interaction_response,
    invocation_from,
};
use super::publish::{publish_commands, PublishScope};
use crate::core::commands::{DispatchOutcome, InboundEvent, Reply};
use crate::core::moderation::LinkScanner;
use async_trait::async_trait;
use serenity::all::{CommandInteraction, Context, EventHandler, Interaction, Message, Ready};
use std::sync::Arc;

pub struct Handler {
    dispatcher: Arc<BotDispatcher>,
    scanner: Arc<LinkScanner>,
    guild_id: Option<u64>,
}

impl Handler {
    pub fn new(dispatcher: Arc<BotDispatcher>, scanner: Arc<LinkScanner>, guild_id: Option<u64>) -> Self {
        Self {
            dispatcher,
            scanner,
            guild_id,
        }
    }
}

fn inbound_event(interaction: &Interaction) -> InboundEvent {
    match interaction {
        Interaction::Command(cmd) => InboundEvent::Command(invocation_from(cmd)),
        Interaction::Component(component) => InboundEvent::Component(component_event_from(component)),
        Interaction::Autocomplete(_) => InboundEvent::Other("autocomplete".to_string()),
        Interaction::Modal(_) => InboundEvent::Other("modal_submit".to_string()),
        Interaction::Ping(_) => InboundEvent::Other("ping".to_string()),
        _ => InboundEvent::Other("unknown".to_string()),
    }
}

/// Deliver the reply of a deferred command. The deferred placeholder is
/// public, so an ephemeral reply goes out as a private follow-up and the
/// placeholder is removed.
async fn finish_deferred(ctx: &Context, cmd: &CommandInteraction, reply: &Reply) -> serenity::Result<()> {
    if reply.ephemeral {
        cmd.create_followup(&ctx.http, followup_message(reply)).await?;
        cmd.delete_response(&ctx.http).await?;
    } else {
        cmd.edit_response(&ctx.http, edit_interaction_response(reply)).await?;
    }
    Ok(())
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        tracing::info!(user = %ready.user.name, guilds = ready.guilds.len(), "Bot is ready");
        let scope = PublishScope::for_guild(self.guild_id);
        publish_commands(&ctx.http, self.dispatcher.commands(), scope).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let event = inbound_event(&interaction);

        let deferred = match &interaction {
            Interaction::Command(cmd) if self.dispatcher.defers(&event) => {
                match cmd.defer(&ctx.http).await {
                    Ok(()) => true,
                    Err(err) => {
                        tracing::warn!(command = %cmd.data.name, "Failed to defer interaction: {}", err);
                        false
                    }
                }
            }
            _ => false,
        };

        let outcome = self.dispatcher.dispatch(event).await;
        let DispatchOutcome::Replied { reply, .. } = outcome else {
            return;
        };

        let sent = match &interaction {
            Interaction::Command(cmd) if deferred => finish_deferred(&ctx, cmd, &reply).await,
            Interaction::Command(cmd) => cmd.create_response(&ctx.http, interaction_response(&reply)).await,
            Interaction::Component(component) => {
                component.create_response(&ctx.http, interaction_response(&reply)).await
            }
            _ => return,
        };

        if let Err(err) = sent {
            tracing::error!("Failed to send interaction response: {}", err);
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot || msg.guild_id.is_none() {
            return;
        }

        let warnings = self.scanner.scan(&msg.content).await;
        if warnings.is_empty() {
            return;
        }

        tracing::info!(
            user_id = msg.author.id.get(),
            channel_id = msg.channel_id.get(),
            count = warnings.len(),
            "Flagged links in message"
        );

        for warning in warnings {
            if let Err(err) = msg.reply(&ctx.http, warning.message()).await {
                tracing::warn!("Failed to send link warning: {}", err);
            }
        }
    }
}

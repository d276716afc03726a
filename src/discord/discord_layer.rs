// Discord layer - serenity adapters, the gateway event handler, and the
// slash commands themselves.

pub mod bot_data;
pub mod convert;
pub mod handler;
pub mod platform;
pub mod publish;

#[path = "commands/command_catalog.rs"]
pub mod commands;

pub use bot_data::{BotData, BotDispatcher, Commands, Components};
pub use handler::Handler;
pub use platform::SerenityPlatform;

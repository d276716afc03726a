// Discord commands module.
// Each feature gets its own command file and a `register` function adding
// its commands to the registry.

pub mod help;
pub mod moderation;
pub mod profile;
pub mod quiz;
pub mod resources;

use crate::discord::bot_data::Commands;

/// Register every slash command, in the order they are listed by `/help`.
pub fn register_all(commands: &mut Commands) {
    help::register(commands);
    moderation::register(commands);
    resources::register(commands);
    profile::register(commands);
    quiz::register(commands);
}

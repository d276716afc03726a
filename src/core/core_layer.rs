// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "commands/mod.rs"]
pub mod commands;

#[path = "helpers/text_helpers.rs"]
pub mod helpers;

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "platform/mod.rs"]
pub mod platform;

#[path = "quiz/mod.rs"]
pub mod quiz;

#[path = "resources/mod.rs"]
pub mod resources;

#[path = "users/mod.rs"]
pub mod users;

// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "http/web_client.rs"]
pub mod http;

#[path = "resources/mod.rs"]
pub mod resources;

#[path = "users/mod.rs"]
pub mod users;

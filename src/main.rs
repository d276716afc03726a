// Entry point of the community bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (JSON/SQLite stores, HTTP)
// - `discord/` = Discord-specific adapters (commands, events)
//
// This file loads configuration, wires the services together and hands the
// event handler to serenity.

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

mod config;

use crate::config::{BotConfig, StorageBackend};
use crate::core::moderation::LinkScanner;
use crate::core::quiz::QuizBoard;
use crate::core::resources::{ResourceService, ResourceStore};
use crate::core::users::UserService;
use crate::discord::{commands, BotData, BotDispatcher, Commands, Components, Handler, SerenityPlatform};
use crate::infra::http::WebClient;
use crate::infra::resources::{JsonResourceStore, SqliteResourceStore};
use crate::infra::users::JsonUserStore;
use anyhow::Context as _;
use serenity::all::{Client, GatewayIntents, Http};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = BotConfig::from_env()?;

    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .with_context(|| format!("Failed to create data directory {}", config.data_dir.display()))?;

    let users = JsonUserStore::open(config.users_file.clone())
        .await
        .context("Failed to open users file")?;

    let resources: Arc<dyn ResourceStore> = match &config.storage {
        StorageBackend::Json { path } => Arc::new(
            JsonResourceStore::open(path.clone())
                .await
                .context("Failed to open resources file")?,
        ),
        StorageBackend::Sqlite { database } => Arc::new(
            SqliteResourceStore::new(database)
                .await
                .context("Failed to initialize SQLite resource store")?,
        ),
    };
    tracing::info!(backend = ?config.storage, "Resource store ready");

    let web = Arc::new(WebClient::new(config.link_probe_timeout).context("Failed to build HTTP client")?);
    let http = Arc::new(Http::new(&config.token));

    let data = BotData {
        users: UserService::new(Arc::new(users)),
        resources: ResourceService::new(resources),
        quiz: QuizBoard::new(),
        platform: Arc::new(SerenityPlatform::new(http, web.clone())),
    };

    let mut registry = Commands::new();
    commands::register_all(&mut registry);
    tracing::info!(count = registry.list().len(), "Commands registered");

    let dispatcher = Arc::new(BotDispatcher::new(
        Arc::new(registry),
        Arc::new(Components::new()),
        Arc::new(data),
    ));
    let scanner = Arc::new(LinkScanner::new(web));
    let handler = Handler::new(dispatcher, scanner, config.guild_id);

    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.token, intents)
        .event_handler(handler)
        .await
        .context("Error creating client")?;

    client.start().await.context("Client error")?;
    Ok(())
}

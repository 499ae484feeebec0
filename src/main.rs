// This is the entry point of the bot control-plane backend.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (SQLite stores)
// - `discord/` = Discord-specific adapters (event reactor, presence, handle)
// - `api/` = REST/WebSocket surface for the dashboard
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Start the dashboard API server
// 4. Run the Discord client with the event reactor attached

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "api/api_layer.rs"]
mod api;
mod config;
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::api::AppState;
use crate::config::AppConfig;
use crate::core::logging::LogService;
use crate::core::settings::SettingsService;
use crate::discord::{BotHandle, Reactor, SettingsCache, READY_TIMEOUT};
use crate::infra::logging::SqliteLogStore;
use crate::infra::settings::SqliteSettingsStore;
use anyhow::Context;
use serenity::all::{Client, GatewayIntents};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();
    let config = AppConfig::from_env()?;

    // Keep the runtime database in a dedicated folder so the repo root
    // stays tidy.
    if let Some(parent) = std::path::Path::new(&config.database_path).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .connect(&format!("sqlite://{}?mode=rwc", config.database_path))
        .await
        .context("failed to connect to control DB")?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Create our services with their dependencies.
    // This is the "composition root" where we wire everything together.

    let settings_store = SqliteSettingsStore::new(pool.clone());
    settings_store
        .migrate()
        .await
        .context("failed to migrate settings table")?;

    let log_store = SqliteLogStore::new(pool);
    log_store
        .migrate()
        .await
        .context("failed to migrate log table")?;

    let logs = LogService::spawn(Arc::new(log_store));
    let cache = Arc::new(SettingsCache::new(SettingsService::new(settings_store)));
    let handle = Arc::new(BotHandle::new());

    // ========================================================================
    // DASHBOARD API
    // ========================================================================

    let state = AppState {
        handle: Arc::clone(&handle),
        cache: Arc::clone(&cache),
        logs: Arc::clone(&logs),
        default_guild_id: config.default_guild_id,
        default_channel_id: config.default_channel_id,
    };
    let router = api::router(state, &config.frontend_origin)?;
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "dashboard API listening");
    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, router).await {
            tracing::error!("dashboard API server exited: {err}");
        }
    });

    // ========================================================================
    // DISCORD CLIENT
    // ========================================================================

    let reactor = Reactor::new(
        Arc::clone(&cache),
        Arc::clone(&logs),
        Arc::clone(&handle),
        config.default_channel_id,
    );

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT; // Required to read message content

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(reactor)
        .await
        .context("error creating Discord client")?;

    // Surface a startup warning if the gateway never comes up; API callers
    // get their own bounded wait.
    let ready_probe = Arc::clone(&handle);
    tokio::spawn(async move {
        if ready_probe.wait_until_ready(READY_TIMEOUT).await.is_err() {
            tracing::warn!("gateway not ready after {READY_TIMEOUT:?}; dashboard actions return 503");
        }
    });

    client.start().await.context("error running Discord client")?;
    Ok(())
}

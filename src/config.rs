// Process configuration, loaded once from the environment at startup.

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub discord_token: String,
    /// SQLite database file; created on first run.
    pub database_path: String,
    /// Address the dashboard API listens on.
    pub bind_addr: String,
    /// Origin allowed by CORS.
    pub frontend_origin: String,
    pub default_guild_id: Option<u64>,
    /// Fallback target when a greeting channel is configured empty.
    pub default_channel_id: Option<u64>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let discord_token =
            std::env::var("DISCORD_TOKEN").context("missing DISCORD_TOKEN environment variable")?;

        Ok(Self {
            discord_token,
            database_path: env_or("DATABASE_PATH", "data/control.db"),
            bind_addr: env_or("BIND_ADDR", "127.0.0.1:8000"),
            frontend_origin: env_or("FRONTEND_ORIGIN", "http://localhost:3000"),
            default_guild_id: optional_id("DISCORD_GUILD_ID")?,
            default_channel_id: optional_id("DISCORD_DEFAULT_CHANNEL_ID")?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

/// Unset and empty both mean "not configured".
fn optional_id(key: &str) -> Result<Option<u64>> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => {
            let id = value
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{key} must be a numeric id, got {value:?}"))?;
            Ok(Some(id))
        }
        _ => Ok(None),
    }
}

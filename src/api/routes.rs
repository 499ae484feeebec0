// Dashboard REST endpoints - a thin layer over the bot handle and the
// core services. Internal failures are converted into the classified
// `ApiError` responses here; transport detail never leaks to the client.

use crate::core::logging::{actions, levels, LogEntry, LogService};
use crate::core::settings::{BotSettings, SettingsStore, SettingsUpdate};
use crate::discord::{BotActionError, BotHandle, SettingsCache};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// How many log rows the dashboard page shows.
const LOG_PAGE_SIZE: u32 = 100;

pub struct AppState<S: SettingsStore> {
    pub handle: Arc<BotHandle>,
    pub cache: Arc<SettingsCache<S>>,
    pub logs: Arc<LogService>,
    pub default_guild_id: Option<u64>,
    pub default_channel_id: Option<u64>,
}

// Manual impl: `#[derive(Clone)]` would demand `S: Clone`, but every field
// is an Arc.
impl<S: SettingsStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            handle: Arc::clone(&self.handle),
            cache: Arc::clone(&self.cache),
            logs: Arc::clone(&self.logs),
            default_guild_id: self.default_guild_id,
            default_channel_id: self.default_channel_id,
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Bot(BotActionError),
    GuildNotFound,
    Storage(anyhow::Error),
}

impl From<BotActionError> for ApiError {
    fn from(err: BotActionError) -> Self {
        ApiError::Bot(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Storage(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Bot(BotActionError::NotReady) => {
                (StatusCode::SERVICE_UNAVAILABLE, "Bot not ready".to_string())
            }
            ApiError::Bot(BotActionError::ChannelNotFound) => {
                (StatusCode::NOT_FOUND, "Channel not found".to_string())
            }
            ApiError::Bot(err @ BotActionError::NotTextChannel) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            ApiError::Bot(err @ BotActionError::Forbidden(_)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            ApiError::Bot(err @ BotActionError::Upstream(_)) => {
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
            ApiError::GuildNotFound => (StatusCode::NOT_FOUND, "Guild not found".to_string()),
            ApiError::Storage(err) => {
                tracing::error!("storage failure in API handler: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal storage error".to_string(),
                )
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
pub struct StatusResponse {
    pub ready: bool,
    pub guild_count: usize,
}

#[derive(Serialize)]
pub struct BotInfo {
    pub name: String,
    pub avatar: String,
    pub status: String,
    pub uptime: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct GuildInfo {
    pub id: u64,
    pub name: String,
    pub member_count: u64,
}

#[derive(Serialize)]
pub struct ChannelInfo {
    pub id: u64,
    pub name: String,
    pub r#type: String,
}

#[derive(Deserialize)]
pub struct MessageRequest {
    pub channel_id: u64,
    pub content: String,
}

#[derive(Serialize)]
pub struct ConfigResponse {
    pub default_guild_id: Option<u64>,
    pub default_channel_id: Option<u64>,
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn bot_status<S: SettingsStore>(
    State(state): State<AppState<S>>,
) -> Json<StatusResponse> {
    Json(StatusResponse {
        ready: state.handle.is_ready(),
        guild_count: state.handle.guilds().len(),
    })
}

pub async fn bot_info<S: SettingsStore>(State(state): State<AppState<S>>) -> Json<BotInfo> {
    let name = state
        .handle
        .current_user_name()
        .unwrap_or_else(|| "Discord Bot".to_string());
    let uptime_seconds = (Utc::now() - state.handle.started_at()).num_seconds().max(0);
    let (days, rest) = (uptime_seconds / 86_400, uptime_seconds % 86_400);
    let (hours, rest) = (rest / 3_600, rest % 3_600);
    let minutes = rest / 60;

    Json(BotInfo {
        name,
        avatar: "🤖".to_string(),
        status: if state.handle.is_ready() { "online" } else { "offline" }.to_string(),
        uptime: format!("{days}d {hours}h {minutes}m"),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn list_guilds<S: SettingsStore>(
    State(state): State<AppState<S>>,
) -> Json<Vec<GuildInfo>> {
    let guilds = state
        .handle
        .guilds()
        .into_iter()
        .map(|guild| GuildInfo {
            id: guild.id,
            name: guild.name,
            member_count: guild.member_count,
        })
        .collect();
    Json(guilds)
}

pub async fn list_channels<S: SettingsStore>(
    State(state): State<AppState<S>>,
    Path(guild_id): Path<u64>,
) -> ApiResult<Json<Vec<ChannelInfo>>> {
    let channels = state
        .handle
        .guild_channels(guild_id)
        .ok_or(ApiError::GuildNotFound)?;
    Ok(Json(
        channels
            .into_iter()
            .map(|channel| ChannelInfo {
                id: channel.id,
                name: channel.name,
                r#type: if channel.text { "text" } else { "other" }.to_string(),
            })
            .collect(),
    ))
}

pub async fn get_settings<S: SettingsStore>(
    State(state): State<AppState<S>>,
) -> ApiResult<Json<BotSettings>> {
    Ok(Json(state.cache.load().await?))
}

pub async fn update_settings<S: SettingsStore + 'static>(
    State(state): State<AppState<S>>,
    Json(update): Json<SettingsUpdate>,
) -> ApiResult<Json<BotSettings>> {
    let settings = state.cache.update(update, &state.handle).await?;
    Ok(Json((*settings).clone()))
}

pub async fn list_logs<S: SettingsStore>(
    State(state): State<AppState<S>>,
) -> ApiResult<Json<Vec<LogEntry>>> {
    Ok(Json(state.logs.recent(LOG_PAGE_SIZE).await?))
}

pub async fn send_message<S: SettingsStore>(
    State(state): State<AppState<S>>,
    Json(request): Json<MessageRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    state
        .handle
        .send_message(request.channel_id, &request.content)
        .await?;

    state.logs.record(LogEntry::now(
        "",
        "bot",
        actions::MESSAGE,
        request.content,
        levels::INFO,
    ));
    Ok(Json(json!({ "status": "sent" })))
}

pub async fn get_config<S: SettingsStore>(
    State(state): State<AppState<S>>,
) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        default_guild_id: state.default_guild_id,
        default_channel_id: state.default_channel_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn error_classes_map_to_distinct_status_codes() {
        assert_eq!(
            status_of(ApiError::Bot(BotActionError::NotReady)),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(ApiError::Bot(BotActionError::ChannelNotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ApiError::Bot(BotActionError::NotTextChannel)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::Bot(BotActionError::Forbidden("Missing Access".to_string()))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::Bot(BotActionError::Upstream("gateway error".to_string()))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(status_of(ApiError::GuildNotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(ApiError::Storage(anyhow::anyhow!("db unavailable"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

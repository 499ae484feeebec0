// API layer - the REST/WebSocket surface the dashboard consumes.

#[path = "routes.rs"]
pub mod routes;

#[path = "ws.rs"]
pub mod ws;

pub use routes::AppState;

use crate::core::settings::SettingsStore;
use anyhow::{Context, Result};
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

/// Build the dashboard router. CORS is restricted to the configured
/// frontend origin.
pub fn router<S: SettingsStore + 'static>(
    state: AppState<S>,
    frontend_origin: &str,
) -> Result<Router> {
    let origin: HeaderValue = frontend_origin
        .parse()
        .with_context(|| format!("invalid frontend origin {frontend_origin}"))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        .route("/health", get(routes::health))
        .route("/bot/status", get(routes::bot_status::<S>))
        .route("/bot/info", get(routes::bot_info::<S>))
        .route("/guilds", get(routes::list_guilds::<S>))
        .route("/guilds/:guild_id/channels", get(routes::list_channels::<S>))
        .route(
            "/settings",
            get(routes::get_settings::<S>).put(routes::update_settings::<S>),
        )
        .route("/logs", get(routes::list_logs::<S>))
        .route("/messages", post(routes::send_message::<S>))
        .route("/config", get(routes::get_config::<S>))
        .route("/ws/events", get(ws::events))
        .layer(cors)
        .with_state(state))
}

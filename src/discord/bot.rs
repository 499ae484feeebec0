// Bot handle - the gateway-facing surface shared with the API layer.
//
// Owns the connection readiness state and the serenity context captured on
// `ready`, and exposes the actions the dashboard needs (guild listing,
// sending messages). Every action failure is classified into one of the
// `BotActionError` variants so the API layer can map them to status codes
// without inspecting transport detail.

use crate::core::greetings::ChannelRef;
use chrono::{DateTime, Utc};
use serenity::all::{Channel, ChannelId, ChannelType, Context, GuildId};
use serenity::http::HttpError;
use std::sync::RwLock;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

/// How long API callers wait for the gateway before giving up.
pub const READY_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum BotActionError {
    #[error("bot connection is not ready")]
    NotReady,

    #[error("channel not found")]
    ChannelNotFound,

    #[error("channel is not a text channel")]
    NotTextChannel,

    #[error("missing permission: {0}")]
    Forbidden(String),

    #[error("Discord API failure: {0}")]
    Upstream(String),
}

/// Cache view of a guild, detached from serenity's cache guard.
#[derive(Debug, Clone)]
pub struct GuildSummary {
    pub id: u64,
    pub name: String,
    pub member_count: u64,
}

pub struct BotHandle {
    ctx: RwLock<Option<Context>>,
    ready_tx: watch::Sender<bool>,
    started_at: DateTime<Utc>,
}

impl BotHandle {
    pub fn new() -> Self {
        let (ready_tx, _) = watch::channel(false);
        Self {
            ctx: RwLock::new(None),
            ready_tx,
            started_at: Utc::now(),
        }
    }

    pub fn set_context(&self, ctx: Context) {
        *self.ctx.write().expect("context lock poisoned") = Some(ctx);
    }

    pub fn context(&self) -> Option<Context> {
        self.ctx.read().expect("context lock poisoned").clone()
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready_tx.send_replace(ready);
    }

    pub fn is_ready(&self) -> bool {
        *self.ready_tx.borrow()
    }

    /// Block until the gateway is ready, bounded by `timeout`. Times out
    /// with `NotReady` instead of hanging.
    pub async fn wait_until_ready(&self, timeout: Duration) -> Result<(), BotActionError> {
        let mut rx = self.ready_tx.subscribe();
        tokio::time::timeout(timeout, rx.wait_for(|ready| *ready))
            .await
            .map_err(|_| BotActionError::NotReady)?
            .map_err(|_| BotActionError::NotReady)?;
        Ok(())
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn current_user_name(&self) -> Option<String> {
        let ctx = self.context()?;
        let name = ctx.cache.current_user().name.clone();
        Some(name)
    }

    pub fn guilds(&self) -> Vec<GuildSummary> {
        let Some(ctx) = self.context() else {
            return Vec::new();
        };
        ctx.cache
            .guilds()
            .into_iter()
            .filter_map(|id| self.guild(id.get()))
            .collect()
    }

    pub fn guild(&self, guild_id: u64) -> Option<GuildSummary> {
        let ctx = self.context()?;
        let guild = ctx.cache.guild(GuildId::new(guild_id))?;
        Some(GuildSummary {
            id: guild_id,
            name: guild.name.clone(),
            member_count: guild.member_count,
        })
    }

    /// Text-capable and other channels of a cached guild, or `None` when
    /// the guild is unknown.
    pub fn guild_channels(&self, guild_id: u64) -> Option<Vec<ChannelRef>> {
        let ctx = self.context()?;
        let guild = ctx.cache.guild(GuildId::new(guild_id))?;
        Some(
            guild
                .channels
                .values()
                .map(|channel| ChannelRef {
                    id: channel.id.get(),
                    name: channel.name.clone(),
                    text: is_text_capable(channel.kind),
                })
                .collect(),
        )
    }

    /// Send `content` to a channel by id. The channel is looked up in the
    /// cache first and fetched over HTTP on a miss; it must be text-capable.
    pub async fn send_message(&self, channel_id: u64, content: &str) -> Result<(), BotActionError> {
        if !self.is_ready() {
            return Err(BotActionError::NotReady);
        }
        let ctx = self.context().ok_or(BotActionError::NotReady)?;
        if channel_id == 0 {
            return Err(BotActionError::ChannelNotFound);
        }
        let id = ChannelId::new(channel_id);

        let cached_kind = ctx.cache.channel(id).map(|channel| channel.kind);
        let kind = match cached_kind {
            Some(kind) => kind,
            None => match ctx.http.get_channel(id).await {
                Ok(Channel::Guild(channel)) => channel.kind,
                Ok(_) => return Err(BotActionError::NotTextChannel),
                Err(err) => return Err(classify(err)),
            },
        };
        if !is_text_capable(kind) {
            return Err(BotActionError::NotTextChannel);
        }

        id.say(&ctx.http, content).await.map_err(classify)?;
        Ok(())
    }
}

impl Default for BotHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// The single notion of "messages can be sent here", shared with the event
/// reactor's channel resolution.
pub fn is_text_capable(kind: ChannelType) -> bool {
    matches!(
        kind,
        ChannelType::Text
            | ChannelType::News
            | ChannelType::PublicThread
            | ChannelType::PrivateThread
            | ChannelType::NewsThread
    )
}

/// Map a serenity error onto the action taxonomy: 404 is not-found, 401/403
/// is forbidden, anything else is an upstream failure.
pub fn classify(err: serenity::Error) -> BotActionError {
    if let serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) = &err {
        if let Some(classified) =
            classify_status(response.status_code.as_u16(), &response.error.message)
        {
            return classified;
        }
    }
    BotActionError::Upstream(err.to_string())
}

/// Status-code half of `classify`, kept separate from the serenity error
/// types. `None` means the status carries no channel-level meaning.
fn classify_status(status: u16, message: &str) -> Option<BotActionError> {
    match status {
        404 => Some(BotActionError::ChannelNotFound),
        401 | 403 => Some(BotActionError::Forbidden(message.to_string())),
        _ => None,
    }
}

// Event reactor - applies the live settings snapshot to gateway events.
//
// One instance per client; serenity delivers events to it in arrival
// order. Handlers read the snapshot, evaluate policy in core, and perform
// the side effects (delete, send, DM, presence). Nothing in here is allowed
// to escape as an error: every side-effecting call is individually guarded
// and degrades to a log line or a silent skip, so one bad event can never
// halt the stream. Durable log writes go through the LogService queue.

use super::bot::{is_text_capable, BotHandle};
use super::snapshot::SettingsCache;
use crate::core::automod;
use crate::core::greetings::{self, ChannelRef};
use crate::core::logging::{actions, levels, LogEntry, LogService};
use crate::core::settings::SettingsStore;
use async_trait::async_trait;
use serenity::all::{
    ChannelId, ConnectionStage, Context, CreateMessage, EventHandler, GuildId, Member, Message,
    Ready, ShardStageUpdateEvent, User,
};
use std::sync::Arc;

pub struct Reactor<S: SettingsStore> {
    cache: Arc<SettingsCache<S>>,
    logs: Arc<LogService>,
    handle: Arc<BotHandle>,
    /// Fallback for greeting channels configured as empty.
    default_channel_id: Option<u64>,
}

impl<S: SettingsStore + 'static> Reactor<S> {
    pub fn new(
        cache: Arc<SettingsCache<S>>,
        logs: Arc<LogService>,
        handle: Arc<BotHandle>,
        default_channel_id: Option<u64>,
    ) -> Self {
        Self {
            cache,
            logs,
            handle,
            default_channel_id,
        }
    }

    /// Owned view of a cached guild: name plus resolvable channels. The
    /// cache guard must not be held across an await point.
    fn guild_view(ctx: &Context, guild_id: GuildId) -> Option<(String, Vec<ChannelRef>)> {
        let guild = ctx.cache.guild(guild_id)?;
        let channels = guild
            .channels
            .values()
            .map(|channel| ChannelRef {
                id: channel.id.get(),
                name: channel.name.clone(),
                text: is_text_capable(channel.kind),
            })
            .collect();
        Some((guild.name.clone(), channels))
    }
}

#[async_trait]
impl<S: SettingsStore + 'static> EventHandler for Reactor<S> {
    async fn ready(&self, ctx: Context, ready: Ready) {
        tracing::info!(user = %ready.user.name, "gateway connection ready");
        self.handle.set_context(ctx);
        self.handle.set_ready(true);

        match self.cache.refresh_and_apply(&self.handle).await {
            Ok(_) => tracing::debug!("settings snapshot refreshed on ready"),
            Err(err) => {
                tracing::warn!("initial settings refresh failed, using defaults: {err:#}")
            }
        }
        self.cache.start_refresh_loop(Arc::clone(&self.handle));
    }

    async fn shard_stage_update(&self, _ctx: Context, event: ShardStageUpdateEvent) {
        let connected = event.new == ConnectionStage::Connected;
        if !connected {
            tracing::info!(stage = ?event.new, "gateway connection left ready state");
        }
        self.handle.set_ready(connected);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let Some(guild_id) = msg.guild_id else {
            // DMs are outside any server context; automod does not apply.
            return;
        };

        let snapshot = self.cache.read();
        let mention_count = msg.mentions.len() + msg.mention_roles.len();
        let Some(reason) = automod::evaluate(&snapshot.automod, &msg.content, mention_count)
        else {
            return;
        };

        if let Err(err) = msg.delete(&ctx.http).await {
            tracing::warn!(
                channel_id = msg.channel_id.get(),
                %reason,
                "could not delete flagged message: {err}"
            );
        }

        let server = Self::guild_view(&ctx, guild_id)
            .map(|(name, _)| name)
            .unwrap_or_default();
        self.logs.record(LogEntry::now(
            server,
            msg.author.name.clone(),
            actions::AUTOMOD,
            format!("{reason}: {}", msg.content),
            levels::WARNING,
        ));
    }

    async fn guild_member_addition(&self, ctx: Context, member: Member) {
        let snapshot = self.cache.read();
        let welcome = snapshot.welcome.clone();
        if !welcome.enabled && !welcome.dm_on_join {
            return;
        }

        let Some((guild_name, channels)) = Self::guild_view(&ctx, member.guild_id) else {
            return;
        };
        let display_name = member.display_name().to_string();
        let text = greetings::render_template(&welcome.message, &display_name, &guild_name);

        if welcome.enabled {
            match greetings::resolve_channel(&welcome.channel, &channels, self.default_channel_id)
            {
                Some(channel_id) => {
                    match ChannelId::new(channel_id).say(&ctx.http, &text).await {
                        Ok(_) => self.logs.record(LogEntry::now(
                            guild_name.clone(),
                            display_name.clone(),
                            actions::JOIN,
                            text.clone(),
                            levels::INFO,
                        )),
                        Err(err) => tracing::warn!(
                            channel_id,
                            "could not send welcome message: {err}"
                        ),
                    }
                }
                None => tracing::debug!(
                    channel = %welcome.channel,
                    "welcome channel did not resolve; skipping"
                ),
            }
        }

        if welcome.dm_on_join {
            let dm = CreateMessage::new().content(&text);
            if let Err(err) = member.user.dm(&ctx.http, dm).await {
                tracing::warn!(
                    user_id = member.user.id.get(),
                    "could not DM welcome message: {err}"
                );
            }
        }
    }

    async fn guild_member_removal(
        &self,
        ctx: Context,
        guild_id: GuildId,
        user: User,
        _member: Option<Member>,
    ) {
        let snapshot = self.cache.read();
        let leave = snapshot.leave.clone();
        if !leave.enabled {
            return;
        }

        let Some((guild_name, channels)) = Self::guild_view(&ctx, guild_id) else {
            return;
        };
        let display_name = user.display_name().to_string();
        let text = greetings::render_template(&leave.message, &display_name, &guild_name);

        let Some(channel_id) =
            greetings::resolve_channel(&leave.channel, &channels, self.default_channel_id)
        else {
            tracing::debug!(channel = %leave.channel, "leave channel did not resolve; skipping");
            return;
        };
        match ChannelId::new(channel_id).say(&ctx.http, &text).await {
            Ok(_) => self.logs.record(LogEntry::now(
                guild_name,
                display_name,
                actions::LEAVE,
                text,
                levels::INFO,
            )),
            Err(err) => tracing::warn!(channel_id, "could not send leave message: {err}"),
        }
    }
}

// Discord layer - gateway lifecycle, event reactor, and presence glue.

#[path = "bot.rs"]
pub mod bot;

#[path = "presence.rs"]
pub mod presence;

#[path = "reactor.rs"]
pub mod reactor;

#[path = "snapshot.rs"]
pub mod snapshot;

pub use bot::{BotActionError, BotHandle, GuildSummary, READY_TIMEOUT};
pub use reactor::Reactor;
pub use snapshot::SettingsCache;

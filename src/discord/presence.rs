// Presence applier - maps the `general` settings section onto the gateway
// presence primitives.
//
// Best-effort by design: a no-op while the connection is not ready, and the
// next periodic settings refresh re-applies it anyway.

use super::bot::BotHandle;
use crate::core::settings::GeneralSettings;
use serenity::all::{ActivityData, OnlineStatus};

/// Re-issue the presence update from the current `general` section.
pub fn apply(handle: &BotHandle, general: &GeneralSettings) {
    if !handle.is_ready() {
        return;
    }
    let Some(ctx) = handle.context() else { return };

    let activity = if general.status.is_empty() {
        None
    } else {
        Some(activity_data(&general.activity_type, &general.status))
    };
    ctx.set_presence(activity, online_status(&general.status));
}

/// Unrecognized activity types fall back to "watching".
fn activity_data(kind: &str, text: &str) -> ActivityData {
    match kind.to_lowercase().as_str() {
        "playing" => ActivityData::playing(text),
        "listening" => ActivityData::listening(text),
        "competing" => ActivityData::competing(text),
        _ => ActivityData::watching(text),
    }
}

/// The status text doubles as the online status when it names one;
/// anything else keeps the bot online.
fn online_status(status: &str) -> OnlineStatus {
    match status.to_lowercase().as_str() {
        "idle" => OnlineStatus::Idle,
        "dnd" | "do not disturb" => OnlineStatus::DoNotDisturb,
        "invisible" => OnlineStatus::Invisible,
        "offline" => OnlineStatus::Offline,
        _ => OnlineStatus::Online,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::all::ActivityType;

    #[test]
    fn activity_type_maps_with_watching_fallback() {
        assert_eq!(activity_data("playing", "x").kind, ActivityType::Playing);
        assert_eq!(activity_data("listening", "x").kind, ActivityType::Listening);
        assert_eq!(activity_data("competing", "x").kind, ActivityType::Competing);
        assert_eq!(activity_data("watching", "x").kind, ActivityType::Watching);
        assert_eq!(activity_data("streaming??", "x").kind, ActivityType::Watching);
    }

    #[test]
    fn activity_carries_the_status_text() {
        assert_eq!(activity_data("watching", "the server").name, "the server");
    }

    #[test]
    fn status_maps_case_insensitively_with_online_fallback() {
        assert_eq!(online_status("idle"), OnlineStatus::Idle);
        assert_eq!(online_status("DND"), OnlineStatus::DoNotDisturb);
        assert_eq!(online_status("invisible"), OnlineStatus::Invisible);
        assert_eq!(online_status("Online"), OnlineStatus::Online);
        assert_eq!(online_status("counting sheep"), OnlineStatus::Online);
    }
}

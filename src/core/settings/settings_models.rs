// Typed bot configuration - the single settings record the dashboard edits.
//
// Each section is serialized as its own camelCase JSON blob so the API layer
// and the storage layout stay in lockstep. Unknown or missing fields fall
// back to the section defaults at the deserialization boundary, so the
// record is never partially null.

use serde::{Deserialize, Serialize};

/// The singleton settings record. Exactly one exists; it is created lazily
/// with defaults on first read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    pub general: GeneralSettings,
    pub automod: AutomodSettings,
    pub welcome: WelcomeSettings,
    pub leave: LeaveSettings,
    pub leveling: LevelingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralSettings {
    pub name: String,
    /// Presence text shown under the bot's name. Also parsed as an online
    /// status when it matches one (online/idle/dnd/invisible/offline).
    pub status: String,
    /// One of playing/watching/listening/competing.
    pub activity_type: String,
    pub avatar_url: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            name: "Discord Bot".to_string(),
            status: "Online".to_string(),
            activity_type: "watching".to_string(),
            avatar_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutomodSettings {
    pub spam_filter: bool,
    pub link_filter: bool,
    pub caps_filter: bool,
    pub word_blacklist: Vec<String>,
    /// Combined user + role mentions allowed per message. 0 disables the check.
    pub max_mentions: u32,
    /// Emoji occurrences allowed per message. 0 disables the check.
    pub max_emojis: u32,
}

impl Default for AutomodSettings {
    fn default() -> Self {
        Self {
            spam_filter: true,
            link_filter: true,
            caps_filter: false,
            word_blacklist: Vec::new(),
            max_mentions: 5,
            max_emojis: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WelcomeSettings {
    pub enabled: bool,
    /// Channel name, "#name", or a numeric channel id.
    pub channel: String,
    /// Template; `{user}` and `{server}` are substituted.
    pub message: String,
    pub dm_on_join: bool,
}

impl Default for WelcomeSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            channel: "#welcome".to_string(),
            message: "Welcome to the server, {user}!".to_string(),
            dm_on_join: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeaveSettings {
    pub enabled: bool,
    pub channel: String,
    pub message: String,
}

impl Default for LeaveSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            channel: "#logs".to_string(),
            message: "{user} has left the server.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LevelingSettings {
    pub enabled: bool,
    pub xp_per_message: u32,
    /// Seconds between XP awards for the same user.
    pub xp_cooldown: u32,
    pub level_up_channel: String,
    pub role_rewards: Vec<RoleReward>,
}

impl Default for LevelingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            xp_per_message: 15,
            xp_cooldown: 60,
            level_up_channel: "#general".to_string(),
            role_rewards: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoleReward {
    pub level: u32,
    pub role_id: String,
}

/// Per-section patch applied by `updateSettings`. Sections left out of the
/// request keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub general: Option<GeneralSettings>,
    pub automod: Option<AutomodSettings>,
    pub welcome: Option<WelcomeSettings>,
    pub leave: Option<LeaveSettings>,
    pub leveling: Option<LevelingSettings>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_section_defaults() {
        let parsed: AutomodSettings = serde_json::from_str(r#"{"linkFilter": false}"#).unwrap();
        assert!(!parsed.link_filter);
        assert!(parsed.spam_filter);
        assert_eq!(parsed.max_mentions, 5);
        assert_eq!(parsed.max_emojis, 10);
    }

    #[test]
    fn sections_round_trip_as_camel_case() {
        let json = serde_json::to_value(WelcomeSettings::default()).unwrap();
        assert_eq!(json["dmOnJoin"], false);
        assert_eq!(json["channel"], "#welcome");
    }

    #[test]
    fn defaults_match_documented_record() {
        let settings = BotSettings::default();
        assert_eq!(settings.general.name, "Discord Bot");
        assert_eq!(settings.general.activity_type, "watching");
        assert_eq!(settings.welcome.message, "Welcome to the server, {user}!");
        assert_eq!(settings.leave.message, "{user} has left the server.");
        assert_eq!(settings.leveling.xp_per_message, 15);
        assert!(settings.leveling.role_rewards.is_empty());
    }
}

// Welcome/leave greeting logic - template rendering and channel resolution.
//
// Pure functions over plain data; the Discord layer extracts a guild's
// channel list into `ChannelRef`s and performs the actual send.

/// A guild channel as seen by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRef {
    pub id: u64,
    pub name: String,
    /// Whether messages can be sent to it (text or announcement channel).
    pub text: bool,
}

/// Substitute the literal `{user}` and `{server}` tokens. No other
/// interpolation, no escaping.
pub fn render_template(template: &str, user: &str, server: &str) -> String {
    template.replace("{user}", user).replace("{server}", server)
}

/// Resolve a configured channel value against a guild's channels.
///
/// - empty value: fall back to the process-wide default channel id, if any
/// - all digits: treat as a channel id; it must be a text-capable channel
/// - leading `#`: strip it, then match by exact name
/// - anything else: match by exact name
///
/// Returns `None` when nothing resolves; callers skip the action.
pub fn resolve_channel(
    configured: &str,
    channels: &[ChannelRef],
    default_channel_id: Option<u64>,
) -> Option<u64> {
    let value = configured.trim();
    if value.is_empty() {
        return default_channel_id;
    }

    if value.chars().all(|c| c.is_ascii_digit()) {
        let id: u64 = value.parse().ok()?;
        return channels.iter().find(|c| c.id == id && c.text).map(|c| c.id);
    }

    let name = value.strip_prefix('#').unwrap_or(value);
    channels
        .iter()
        .find(|c| c.text && c.name == name)
        .map(|c| c.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels() -> Vec<ChannelRef> {
        vec![
            ChannelRef {
                id: 100,
                name: "general".to_string(),
                text: true,
            },
            ChannelRef {
                id: 200,
                name: "welcome".to_string(),
                text: true,
            },
            ChannelRef {
                id: 300,
                name: "voice-lounge".to_string(),
                text: false,
            },
        ]
    }

    #[test]
    fn renders_both_tokens_and_nothing_else() {
        let rendered = render_template("Welcome, {user}! Enjoy {server}", "Ann", "Acme");
        assert_eq!(rendered, "Welcome, Ann! Enjoy Acme");

        let rendered = render_template("no tokens {here}", "Ann", "Acme");
        assert_eq!(rendered, "no tokens {here}");
    }

    #[test]
    fn numeric_value_resolves_by_id() {
        assert_eq!(resolve_channel("100", &channels(), None), Some(100));
    }

    #[test]
    fn numeric_value_must_be_text_capable() {
        assert_eq!(resolve_channel("300", &channels(), None), None);
        assert_eq!(resolve_channel("999", &channels(), None), None);
    }

    #[test]
    fn hash_prefix_is_stripped_before_name_match() {
        assert_eq!(resolve_channel("#general", &channels(), None), Some(100));
    }

    #[test]
    fn bare_name_matches_directly() {
        assert_eq!(resolve_channel("welcome", &channels(), None), Some(200));
        assert_eq!(resolve_channel("missing", &channels(), None), None);
    }

    #[test]
    fn empty_value_falls_back_to_process_default() {
        assert_eq!(resolve_channel("", &channels(), Some(42)), Some(42));
        assert_eq!(resolve_channel("  ", &channels(), Some(42)), Some(42));
        assert_eq!(resolve_channel("", &channels(), None), None);
    }

    #[test]
    fn name_match_skips_non_text_channels() {
        assert_eq!(resolve_channel("voice-lounge", &channels(), None), None);
    }
}

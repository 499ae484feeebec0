// Automod evaluator - pure content policy checks for inbound messages.
//
// Checks run in a fixed priority order and the first match wins, so a
// message is never flagged for more than one reason. The caller (the
// Discord event reactor) is responsible for the side effects: deleting
// the message and writing the activity log entry.
//
// NO Discord dependencies here - just content and counts.

use crate::core::settings::AutomodSettings;
use std::fmt;

/// Minimum alphabetic length before the caps filter applies.
const CAPS_MIN_LETTERS: usize = 10;
/// Uppercase ratio above which a message counts as shouting (strict >).
const CAPS_RATIO: f32 = 0.7;

/// Why a message was flagged. Renders as the human-readable reason that
/// goes into the activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomodReason {
    Link,
    BlacklistedWord,
    TooManyMentions,
    ExcessiveCaps,
    TooManyEmojis,
}

impl fmt::Display for AutomodReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AutomodReason::Link => "Link filter",
            AutomodReason::BlacklistedWord => "Blacklisted word",
            AutomodReason::TooManyMentions => "Too many mentions",
            AutomodReason::ExcessiveCaps => "Excessive caps",
            AutomodReason::TooManyEmojis => "Too many emojis",
        };
        f.write_str(text)
    }
}

/// Evaluate a message against the automod configuration.
///
/// `mention_count` is the combined number of direct user mentions and role
/// mentions. Returns the first matching reason in priority order
/// (link > blacklist > mentions > caps > emojis), or `None`.
pub fn evaluate(
    config: &AutomodSettings,
    content: &str,
    mention_count: usize,
) -> Option<AutomodReason> {
    if config.link_filter && contains_link(content) {
        return Some(AutomodReason::Link);
    }

    if !config.word_blacklist.is_empty() {
        let lowered = content.to_lowercase();
        if config
            .word_blacklist
            .iter()
            .any(|word| !word.is_empty() && lowered.contains(&word.to_lowercase()))
        {
            return Some(AutomodReason::BlacklistedWord);
        }
    }

    if config.max_mentions > 0 && mention_count > config.max_mentions as usize {
        return Some(AutomodReason::TooManyMentions);
    }

    if config.caps_filter && is_shouting(content) {
        return Some(AutomodReason::ExcessiveCaps);
    }

    if config.max_emojis > 0 && count_emojis(content) > config.max_emojis as usize {
        return Some(AutomodReason::TooManyEmojis);
    }

    None
}

fn contains_link(content: &str) -> bool {
    content.contains("http://") || content.contains("https://") || content.contains("www.")
}

fn is_shouting(content: &str) -> bool {
    let letters = content.chars().filter(|c| c.is_alphabetic()).count();
    if letters < CAPS_MIN_LETTERS {
        return false;
    }
    let uppercase = content.chars().filter(|c| c.is_uppercase()).count();
    uppercase as f32 / letters as f32 > CAPS_RATIO
}

/// Count emoji occurrences: custom `<:name:id>` / `<a:name:id>` tokens plus
/// Unicode code points in the common emoji blocks.
fn count_emojis(content: &str) -> usize {
    let custom = count_custom_emojis(content);
    let unicode = content.chars().filter(|&c| is_unicode_emoji(c)).count();
    custom + unicode
}

fn count_custom_emojis(content: &str) -> usize {
    let mut count = 0;
    let mut rest = content;
    while let Some(start) = rest.find('<') {
        rest = &rest[start + 1..];
        match rest.find('>') {
            Some(end) if is_custom_emoji_body(&rest[..end]) => {
                count += 1;
                rest = &rest[end + 1..];
            }
            // A malformed candidate may hide a real token behind a nested
            // '<' (e.g. "<<:wave:123>"), so only this '<' is consumed.
            _ => {}
        }
    }
    count
}

/// Body between `<` and `>`: optional `a`, then `:name:id` with a numeric id.
fn is_custom_emoji_body(body: &str) -> bool {
    let body = body.strip_prefix('a').unwrap_or(body);
    let Some(body) = body.strip_prefix(':') else {
        return false;
    };
    let mut parts = body.splitn(2, ':');
    let name = parts.next().unwrap_or("");
    let Some(id) = parts.next() else { return false };
    !name.is_empty() && !id.is_empty() && id.chars().all(|c| c.is_ascii_digit())
}

fn is_unicode_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x1F300..=0x1F5FF // symbols & pictographs
        | 0x1F600..=0x1F64F // emoticons
        | 0x1F680..=0x1F6FF // transport & map
        | 0x1F900..=0x1F9FF // supplemental symbols
        | 0x1FA70..=0x1FAFF // extended-A
        | 0x2600..=0x26FF // miscellaneous symbols
        | 0x2700..=0x27BF // dingbats
    )
}

use chrono::Utc;
use serde::Serialize;

/// Timestamp layout the dashboard sorts on. Do not change it.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub mod actions {
    pub const AUTOMOD: &str = "automod";
    pub const MESSAGE: &str = "message";
    pub const JOIN: &str = "join";
    pub const LEAVE: &str = "leave";
}

pub mod levels {
    pub const INFO: &str = "info";
    pub const WARNING: &str = "warning";
}

/// One immutable row in the activity log. The id doubles as a creation
/// ordinal; it is the creation time in Unix milliseconds, so concurrent
/// sub-millisecond writes can collide (accepted limitation).
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub id: i64,
    pub timestamp: String,
    /// Guild name; empty for bot-originated actions.
    pub server: String,
    pub user: String,
    pub action: String,
    pub details: String,
    pub level: String,
}

impl LogEntry {
    pub fn now(
        server: impl Into<String>,
        user: impl Into<String>,
        action: &str,
        details: impl Into<String>,
        level: &str,
    ) -> Self {
        let created = Utc::now();
        Self {
            id: created.timestamp_millis(),
            timestamp: created.format(TIMESTAMP_FORMAT).to_string(),
            server: server.into(),
            user: user.into(),
            action: action.to_string(),
            details: details.into(),
            level: level.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_is_second_precision_utc() {
        let entry = LogEntry::now("", "bot", actions::MESSAGE, "hello", levels::INFO);
        // "YYYY-MM-DD HH:MM:SS" is 19 chars with a single space separator.
        assert_eq!(entry.timestamp.len(), 19);
        assert_eq!(entry.timestamp.as_bytes()[10], b' ');
        assert!(entry.id > 0);
    }
}

use crate::core::settings::{
    AutomodSettings, BotSettings, GeneralSettings, LeaveSettings, LevelingSettings,
    SettingsStore, WelcomeSettings,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};

/// Single-row table, one JSON blob per settings section.
pub struct SqliteSettingsStore {
    pool: Pool<Sqlite>,
}

impl SqliteSettingsStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bot_settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                general TEXT NOT NULL,
                automod TEXT NOT NULL,
                welcome TEXT NOT NULL,
                leave TEXT NOT NULL,
                leveling TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn section<T: serde::de::DeserializeOwned>(row: &sqlx::sqlite::SqliteRow, column: &str) -> Result<T> {
    let raw: String = row.get(column);
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in settings column {column}"))
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn load(&self) -> Result<Option<BotSettings>> {
        let row = sqlx::query("SELECT * FROM bot_settings WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else { return Ok(None) };
        Ok(Some(BotSettings {
            general: section::<GeneralSettings>(&row, "general")?,
            automod: section::<AutomodSettings>(&row, "automod")?,
            welcome: section::<WelcomeSettings>(&row, "welcome")?,
            leave: section::<LeaveSettings>(&row, "leave")?,
            leveling: section::<LevelingSettings>(&row, "leveling")?,
        }))
    }

    async fn save(&self, settings: &BotSettings) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO bot_settings (id, general, automod, welcome, leave, leveling)
            VALUES (1, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                general = excluded.general,
                automod = excluded.automod,
                welcome = excluded.welcome,
                leave = excluded.leave,
                leveling = excluded.leveling
            "#,
        )
        .bind(serde_json::to_string(&settings.general)?)
        .bind(serde_json::to_string(&settings.automod)?)
        .bind(serde_json::to_string(&settings.welcome)?)
        .bind(serde_json::to_string(&settings.leave)?)
        .bind(serde_json::to_string(&settings.leveling)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn store() -> (SqliteSettingsStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.db");
        let pool = SqlitePoolOptions::new()
            .connect(&format!("sqlite://{}?mode=rwc", path.display()))
            .await
            .unwrap();
        let store = SqliteSettingsStore::new(pool);
        store.migrate().await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn load_returns_none_before_first_save() {
        let (store, _dir) = store().await;
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load_round_trips_the_record() {
        let (store, _dir) = store().await;

        let mut settings = BotSettings::default();
        settings.welcome.enabled = true;
        settings.automod.word_blacklist = vec!["spoiler".to_string()];
        store.save(&settings).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, settings);
    }

    #[tokio::test]
    async fn save_replaces_the_single_row() {
        let (store, _dir) = store().await;

        store.save(&BotSettings::default()).await.unwrap();
        let mut updated = BotSettings::default();
        updated.general.name = "Acme Bot".to_string();
        store.save(&updated).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.general.name, "Acme Bot");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bot_settings")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}

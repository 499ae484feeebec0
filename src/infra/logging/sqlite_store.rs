use crate::core::logging::{LogEntry, LogStore};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteLogStore {
    pool: Pool<Sqlite>,
}

impl SqliteLogStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bot_logs (
                id INTEGER PRIMARY KEY,
                timestamp TEXT NOT NULL,
                server TEXT NOT NULL,
                user TEXT NOT NULL,
                action TEXT NOT NULL,
                details TEXT NOT NULL,
                level TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl LogStore for SqliteLogStore {
    async fn append(&self, entry: &LogEntry) -> Result<()> {
        // Millisecond ids can collide under concurrent writes; last writer
        // wins rather than failing the queue.
        sqlx::query(
            r#"
            INSERT INTO bot_logs (id, timestamp, server, user, action, details, level)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                timestamp = excluded.timestamp,
                server = excluded.server,
                user = excluded.user,
                action = excluded.action,
                details = excluded.details,
                level = excluded.level
            "#,
        )
        .bind(entry.id)
        .bind(&entry.timestamp)
        .bind(&entry.server)
        .bind(&entry.user)
        .bind(&entry.action)
        .bind(&entry.details)
        .bind(&entry.level)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recent(&self, limit: u32) -> Result<Vec<LogEntry>> {
        let rows = sqlx::query("SELECT * FROM bot_logs ORDER BY id DESC LIMIT ?")
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| LogEntry {
                id: row.get("id"),
                timestamp: row.get("timestamp"),
                server: row.get("server"),
                user: row.get("user"),
                action: row.get("action"),
                details: row.get("details"),
                level: row.get("level"),
            })
            .collect())
    }
}

// Activity log service - append-only record of notable bot actions.
//
// Durable writes happen on a background task fed by an unbounded queue so
// a slow storage backend can never stall event delivery. A failed write is
// logged and dropped, not retried.

use super::log_models::LogEntry;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Port for persisting log entries.
#[async_trait]
pub trait LogStore: Send + Sync {
    async fn append(&self, entry: &LogEntry) -> Result<()>;

    /// Most recent entries, newest first.
    async fn recent(&self, limit: u32) -> Result<Vec<LogEntry>>;
}

pub struct LogService {
    tx: mpsc::UnboundedSender<LogEntry>,
    store: Arc<dyn LogStore>,
}

impl LogService {
    /// Start the background writer and return the service handle.
    pub fn spawn(store: Arc<dyn LogStore>) -> Arc<Self> {
        let (tx, mut rx) = mpsc::unbounded_channel::<LogEntry>();
        let writer = Arc::clone(&store);
        tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                if let Err(err) = writer.append(&entry).await {
                    tracing::warn!(action = %entry.action, "failed to persist log entry: {err:#}");
                }
            }
        });
        Arc::new(Self { tx, store })
    }

    /// Queue an entry for durable storage. Never blocks the caller.
    pub fn record(&self, entry: LogEntry) {
        if self.tx.send(entry).is_err() {
            tracing::warn!("log writer task is gone; entry dropped");
        }
    }

    pub async fn recent(&self, limit: u32) -> Result<Vec<LogEntry>> {
        self.store.recent(limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::log_models::{actions, levels};
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct MockLogStore {
        entries: Mutex<Vec<LogEntry>>,
        fail: bool,
    }

    #[async_trait]
    impl LogStore for MockLogStore {
        async fn append(&self, entry: &LogEntry) -> Result<()> {
            if self.fail {
                anyhow::bail!("storage unavailable");
            }
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }

        async fn recent(&self, limit: u32) -> Result<Vec<LogEntry>> {
            let mut entries = self.entries.lock().unwrap().clone();
            entries.reverse();
            entries.truncate(limit as usize);
            Ok(entries)
        }
    }

    async fn drain(store: &MockLogStore, expected: usize) {
        for _ in 0..100 {
            if store.entries.lock().unwrap().len() >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("writer never persisted {expected} entries");
    }

    #[tokio::test]
    async fn record_is_drained_to_the_store() {
        let store = Arc::new(MockLogStore::default());
        let service = LogService::spawn(store.clone());

        service.record(LogEntry::now("Acme", "ann", actions::JOIN, "joined", levels::INFO));
        service.record(LogEntry::now("Acme", "ann", actions::LEAVE, "left", levels::INFO));

        drain(&store, 2).await;
        let recent = service.recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].action, actions::LEAVE);
    }

    #[tokio::test]
    async fn failed_write_does_not_stop_the_writer() {
        let store = Arc::new(MockLogStore {
            fail: true,
            ..Default::default()
        });
        let service = LogService::spawn(store.clone());

        // Both sends succeed from the caller's point of view.
        service.record(LogEntry::now("", "bot", actions::MESSAGE, "one", levels::INFO));
        service.record(LogEntry::now("", "bot", actions::MESSAGE, "two", levels::INFO));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(store.entries.lock().unwrap().is_empty());
    }
}

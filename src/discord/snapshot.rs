// Settings snapshot cache - the reactor's in-memory mirror of the record.
//
// Event handlers read a complete, immutable `Arc<BotSettings>`; refresh
// replaces the whole Arc under a short write lock, so a reader can never
// observe a half-updated mix of sections. A failed refresh keeps the stale
// snapshot in place until the next attempt.

use super::bot::BotHandle;
use super::presence;
use crate::core::settings::{BotSettings, SettingsService, SettingsStore, SettingsUpdate};
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Background safety net against external writers the process never saw.
const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

pub struct SettingsCache<S: SettingsStore> {
    service: SettingsService<S>,
    snapshot: RwLock<Arc<BotSettings>>,
    refresher_started: AtomicBool,
}

impl<S: SettingsStore> SettingsCache<S> {
    pub fn new(service: SettingsService<S>) -> Self {
        Self {
            service,
            snapshot: RwLock::new(Arc::new(BotSettings::default())),
            refresher_started: AtomicBool::new(false),
        }
    }

    /// Current snapshot. Never touches storage; before the first successful
    /// refresh this is the built-in defaults.
    pub fn read(&self) -> Arc<BotSettings> {
        self.snapshot.read().expect("snapshot lock poisoned").clone()
    }

    /// Read the durable record without touching the snapshot (creating it
    /// with defaults if absent). Used by the API's settings endpoint.
    pub async fn load(&self) -> Result<BotSettings> {
        self.service.get_or_init().await
    }

    /// Reload the record from storage (creating it with defaults if absent)
    /// and atomically swap the snapshot.
    pub async fn refresh(&self) -> Result<Arc<BotSettings>> {
        let fresh = Arc::new(self.service.get_or_init().await?);
        *self.snapshot.write().expect("snapshot lock poisoned") = Arc::clone(&fresh);
        Ok(fresh)
    }

    /// Refresh and re-apply presence from the new `general` section.
    pub async fn refresh_and_apply(&self, handle: &BotHandle) -> Result<Arc<BotSettings>> {
        let fresh = self.refresh().await?;
        presence::apply(handle, &fresh.general);
        Ok(fresh)
    }

    /// Persist a per-section update, then refresh immediately so the
    /// reactor sees it without waiting for the periodic loop.
    pub async fn update(
        &self,
        update: SettingsUpdate,
        handle: &BotHandle,
    ) -> Result<Arc<BotSettings>> {
        self.service.update(update).await?;
        self.refresh_and_apply(handle).await
    }

    /// Periodic-loop body. While the gateway is down the tick skips storage
    /// entirely; the `ready` handler refreshes on reconnect anyway.
    async fn refresh_if_connected(&self, handle: &BotHandle) {
        if !handle.is_ready() {
            return;
        }
        if let Err(err) = self.refresh_and_apply(handle).await {
            tracing::warn!("periodic settings refresh failed, keeping stale snapshot: {err:#}");
        }
    }
}

impl<S: SettingsStore + 'static> SettingsCache<S> {
    /// Start the periodic refresh loop. Idempotent: reconnects re-entering
    /// `ready` never spawn a second loop.
    pub fn start_refresh_loop(self: &Arc<Self>, handle: Arc<BotHandle>) {
        if self.refresher_started.swap(true, Ordering::SeqCst) {
            return;
        }
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(REFRESH_INTERVAL);
            // The immediate first tick; `ready` already refreshed.
            interval.tick().await;
            loop {
                interval.tick().await;
                cache.refresh_if_connected(&handle).await;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::WelcomeSettings;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Mock store whose state is shared through `Arc` so tests keep a
    /// handle after the store moves into the service.
    #[derive(Default, Clone)]
    struct MockSettingsStore {
        record: Arc<Mutex<Option<BotSettings>>>,
        fail: Arc<Mutex<bool>>,
        loads: Arc<Mutex<u32>>,
    }

    #[async_trait]
    impl SettingsStore for MockSettingsStore {
        async fn load(&self) -> Result<Option<BotSettings>> {
            *self.loads.lock().unwrap() += 1;
            if *self.fail.lock().unwrap() {
                anyhow::bail!("storage unreachable");
            }
            Ok(self.record.lock().unwrap().clone())
        }

        async fn save(&self, settings: &BotSettings) -> Result<()> {
            *self.record.lock().unwrap() = Some(settings.clone());
            Ok(())
        }
    }

    fn cache_with(store: MockSettingsStore) -> SettingsCache<MockSettingsStore> {
        SettingsCache::new(SettingsService::new(store))
    }

    #[tokio::test]
    async fn read_before_first_refresh_yields_defaults() {
        let cache = cache_with(MockSettingsStore::default());
        assert_eq!(*cache.read(), BotSettings::default());
    }

    #[tokio::test]
    async fn refresh_swaps_in_the_stored_record() {
        let store = MockSettingsStore::default();
        let mut stored = BotSettings::default();
        stored.welcome = WelcomeSettings {
            enabled: true,
            ..Default::default()
        };
        *store.record.lock().unwrap() = Some(stored.clone());

        let cache = cache_with(store);
        cache.refresh().await.unwrap();
        assert_eq!(*cache.read(), stored);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_the_previous_snapshot() {
        let store = MockSettingsStore::default();
        let mut stored = BotSettings::default();
        stored.general.name = "Acme Bot".to_string();
        *store.record.lock().unwrap() = Some(stored.clone());

        let cache = cache_with(store.clone());
        cache.refresh().await.unwrap();

        *store.fail.lock().unwrap() = true;
        assert!(cache.refresh().await.is_err());
        assert_eq!(cache.read().general.name, "Acme Bot");
    }

    #[tokio::test]
    async fn readers_see_old_or_new_snapshot_never_a_mix() {
        let store = MockSettingsStore::default();
        let cache = Arc::new(cache_with(store.clone()));

        // Seed a distinct initial snapshot, then point storage at the next
        // generation; both fields change together between generations.
        let mut initial = BotSettings::default();
        initial.general.name = "A".to_string();
        initial.welcome.channel = "A".to_string();
        *cache.snapshot.write().unwrap() = Arc::new(initial);

        let mut next = BotSettings::default();
        next.general.name = "B".to_string();
        next.welcome.channel = "B".to_string();
        *store.record.lock().unwrap() = Some(next);

        let reader = Arc::clone(&cache);
        let read_task = tokio::spawn(async move {
            for _ in 0..500 {
                let snap = reader.read();
                assert_eq!(snap.general.name, snap.welcome.channel);
                tokio::task::yield_now().await;
            }
        });
        let writer = Arc::clone(&cache);
        let write_task = tokio::spawn(async move {
            for _ in 0..100 {
                writer.refresh().await.unwrap();
                tokio::task::yield_now().await;
            }
        });

        read_task.await.unwrap();
        write_task.await.unwrap();
        assert_eq!(cache.read().general.name, "B");
    }

    #[tokio::test]
    async fn periodic_refresh_skips_storage_while_disconnected() {
        let store = MockSettingsStore::default();
        let cache = cache_with(store.clone());
        let handle = BotHandle::new();

        cache.refresh_if_connected(&handle).await;
        assert_eq!(*store.loads.lock().unwrap(), 0);

        handle.set_ready(true);
        cache.refresh_if_connected(&handle).await;
        assert_eq!(*store.loads.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn refresh_loop_starts_only_once() {
        let cache = Arc::new(cache_with(MockSettingsStore::default()));
        let handle = Arc::new(BotHandle::new());

        cache.start_refresh_loop(Arc::clone(&handle));
        assert!(cache.refresher_started.load(Ordering::SeqCst));

        // A reconnect calling this again must not spawn a second loop.
        cache.start_refresh_loop(handle);
        assert!(cache.refresher_started.load(Ordering::SeqCst));
    }
}

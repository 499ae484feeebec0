// Settings service - owns the singleton configuration record.
//
// Storage goes through the `SettingsStore` port so the service can be
// tested against an in-memory store and wired to SQLite in production.
// NO Discord dependencies here - just the record lifecycle.

use super::settings_models::{BotSettings, SettingsUpdate};
use anyhow::Result;
use async_trait::async_trait;

/// Port for persisting the settings record.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load the record, or `None` if it was never created.
    async fn load(&self) -> Result<Option<BotSettings>>;

    /// Persist the record, replacing any existing one.
    async fn save(&self, settings: &BotSettings) -> Result<()>;
}

pub struct SettingsService<S: SettingsStore> {
    store: S,
}

impl<S: SettingsStore> SettingsService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Return the settings record, persisting the documented defaults the
    /// first time it is requested. Subsequent reads return the stored record.
    pub async fn get_or_init(&self) -> Result<BotSettings> {
        if let Some(existing) = self.store.load().await? {
            return Ok(existing);
        }
        let defaults = BotSettings::default();
        self.store.save(&defaults).await?;
        Ok(defaults)
    }

    /// Apply a per-section patch and persist the merged record.
    pub async fn update(&self, update: SettingsUpdate) -> Result<BotSettings> {
        let mut settings = self.get_or_init().await?;
        if let Some(general) = update.general {
            settings.general = general;
        }
        if let Some(automod) = update.automod {
            settings.automod = automod;
        }
        if let Some(welcome) = update.welcome {
            settings.welcome = welcome;
        }
        if let Some(leave) = update.leave {
            settings.leave = leave;
        }
        if let Some(leveling) = update.leveling {
            settings.leveling = leveling;
        }
        self.store.save(&settings).await?;
        Ok(settings)
    }
}

use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::models::settings::staging_path;
use crate::models::{MessagingCredentials, Settings, WatchedItem};
use crate::utils::error::Result;

/// Alert routing captured at the moment an item flips, so a notification
/// task never holds the settings lock.
#[derive(Debug, Clone)]
pub struct MessagingSnapshot {
    pub credentials: MessagingCredentials,
    pub phone: String,
}

/// Process-wide settings handle shared by the monitor and its item tasks.
pub struct SettingsStore {
    path: PathBuf,
    persist_on_change: bool,
    settings: RwLock<Settings>,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>, settings: Settings, persist_on_change: bool) -> Self {
        Self {
            path: path.into(),
            persist_on_change,
            settings: RwLock::new(settings),
        }
    }

    pub async fn snapshot(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Items still waiting for stock, paired with their position in the list.
    pub async fn pending_items(&self) -> Vec<(usize, WatchedItem)> {
        let settings = self.settings.read().await;
        settings
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.in_stock)
            .map(|(index, item)| (index, item.clone()))
            .collect()
    }

    pub async fn poll_interval(&self) -> Duration {
        self.settings.read().await.poll_interval()
    }

    pub async fn messaging_snapshot(&self) -> MessagingSnapshot {
        let settings = self.settings.read().await;
        MessagingSnapshot {
            credentials: settings.twilio.clone(),
            phone: settings.phone.clone(),
        }
    }

    /// Flips the item at `index` to in stock.
    ///
    /// Returns `Ok(true)` only for the call that made the transition; an item
    /// already in stock (or an index past the end) yields `Ok(false)`. The flag
    /// stays set even when persisting it fails.
    ///
    /// The write guard is held until the file has been replaced, so the file
    /// on disk always reflects the latest flip.
    pub async fn mark_in_stock(&self, index: usize) -> Result<bool> {
        let mut settings = self.settings.write().await;
        match settings.items.get_mut(index) {
            Some(item) if !item.in_stock => item.in_stock = true,
            _ => return Ok(false),
        }

        if !self.persist_on_change {
            return Ok(true);
        }

        let json = settings.to_json()?;
        let staging = staging_path(&self.path);
        tokio::fs::write(&staging, json).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        drop(settings);

        tracing::debug!("Persisted settings to {}", self.path.display());
        Ok(true)
    }
}

use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

use crate::config::BrowserConfig;
use crate::models::{RetailerTable, WatchedItem};
use crate::plugins::traits::{Notifier, PageProber, ProbeRequest, SmsMessage};
use crate::store::SettingsStore;
use crate::utils::error::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    InStock,
    OutOfStock,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct CheckReport {
    pub index: usize,
    pub name: String,
    pub outcome: CheckOutcome,
    pub checked_at: DateTime<Utc>,
}

/// Probe identity and timing shared by every item check.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub user_agent: String,
    pub timeout: Duration,
}

impl From<&BrowserConfig> for ProbeSettings {
    fn from(config: &BrowserConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_millis(config.probe_timeout_ms),
        }
    }
}

/// Item checks dispatched by one sweep. Dropping it leaves them running.
pub struct Sweep {
    handles: Vec<(usize, String, JoinHandle<CheckReport>)>,
}

impl Sweep {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Waits for every check, in item order. A panicked check surfaces as
    /// a `Failed` report for its item.
    pub async fn join(self) -> Vec<CheckReport> {
        let (items, handles): (Vec<_>, Vec<_>) = self
            .handles
            .into_iter()
            .map(|(index, name, handle)| ((index, name), handle))
            .unzip();

        join_all(handles)
            .await
            .into_iter()
            .zip(items)
            .map(|(joined, (index, name))| match joined {
                Ok(report) => report,
                Err(e) => CheckReport {
                    index,
                    name,
                    outcome: CheckOutcome::Failed(format!("check task failed: {}", e)),
                    checked_at: Utc::now(),
                },
            })
            .collect()
    }
}

/// Repeatedly sweeps the watched items and alerts once per item that
/// becomes purchasable.
#[derive(Clone)]
pub struct Monitor {
    store: Arc<SettingsStore>,
    retailers: Arc<RetailerTable>,
    prober: Arc<dyn PageProber>,
    notifier: Arc<dyn Notifier>,
    probe: ProbeSettings,
}

impl Monitor {
    pub fn new(
        store: Arc<SettingsStore>,
        retailers: Arc<RetailerTable>,
        prober: Arc<dyn PageProber>,
        notifier: Arc<dyn Notifier>,
        probe: ProbeSettings,
    ) -> Self {
        Self {
            store,
            retailers,
            prober,
            notifier,
            probe,
        }
    }

    /// Sweeps every `interval` until `shutdown` resolves. The next sweep is
    /// timed from dispatch, not from completion, so slow sweeps may overlap.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let sweep = self.sweep().await;
            tracing::debug!("Dispatched {} stock checks", sweep.len());

            let interval = self.store.poll_interval().await;
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Stopping monitor");
                    break;
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }

    /// Spawns one check per item not yet in stock and returns without waiting.
    pub async fn sweep(&self) -> Sweep {
        let handles = self
            .store
            .pending_items()
            .await
            .into_iter()
            .map(|(index, item)| {
                let monitor = self.clone();
                let name = item.name.clone();
                let handle = tokio::spawn(async move { monitor.check_item(index, item).await });
                (index, name, handle)
            })
            .collect();

        Sweep { handles }
    }

    /// Checks one item and logs the result. Never fails: errors become
    /// `CheckOutcome::Failed`.
    pub async fn check_item(&self, index: usize, item: WatchedItem) -> CheckReport {
        let outcome = match self.probe_item(&item).await {
            Ok(true) => {
                self.record_in_stock(index, &item).await;
                tracing::info!(item = %item.name, url = %item.url, "IN STOCK: {}", item.name);
                CheckOutcome::InStock
            }
            Ok(false) => {
                tracing::info!(item = %item.name, "Out of stock: {}", item.name);
                CheckOutcome::OutOfStock
            }
            Err(e) => {
                tracing::warn!(item = %item.name, error = %e, "Error checking for {}", item.name);
                CheckOutcome::Failed(e.to_string())
            }
        };

        CheckReport {
            index,
            name: item.name,
            outcome,
            checked_at: Utc::now(),
        }
    }

    async fn probe_item(&self, item: &WatchedItem) -> Result<bool> {
        // Unknown retailers can never match, so skip loading the page.
        let Some(selector) = self.retailers.selector_for(&item.retailer) else {
            tracing::warn!(
                item = %item.name,
                "Unknown retailer '{}'; expected one of: {}",
                item.retailer,
                self.retailers.describe_keys()
            );
            return Ok(false);
        };

        let url = Url::parse(&item.url).map_err(|e| AppError::InvalidUrl {
            url: item.url.clone(),
            message: e.to_string(),
        })?;

        let request = ProbeRequest {
            url,
            selector: selector.to_string(),
            user_agent: self.probe.user_agent.clone(),
            timeout: self.probe.timeout,
        };

        self.prober.probe(&request).await
    }

    async fn record_in_stock(&self, index: usize, item: &WatchedItem) {
        match self.store.mark_in_stock(index).await {
            Ok(true) => self.dispatch_notification(item).await,
            // An overlapping sweep got here first and already alerted.
            Ok(false) => {}
            Err(e) => {
                tracing::error!(item = %item.name, error = %e, "Failed to persist stock state");
                self.dispatch_notification(item).await;
            }
        }
    }

    /// Fire-and-forget: delivery failures are logged, never propagated.
    async fn dispatch_notification(&self, item: &WatchedItem) {
        let messaging = self.store.messaging_snapshot().await;
        let message = SmsMessage::in_stock(
            &item.name,
            &item.url,
            &messaging.credentials.number,
            &messaging.phone,
        );
        let notifier = Arc::clone(&self.notifier);
        let item_name = item.name.clone();

        tokio::spawn(async move {
            match notifier.send(&messaging.credentials, &message).await {
                Ok(receipt) => {
                    tracing::debug!(item = %item_name, message_id = ?receipt.message_id, "Sent stock alert");
                }
                Err(e) => {
                    tracing::error!(item = %item_name, error = %e, "Failed to send stock alert");
                }
            }
        });
    }
}

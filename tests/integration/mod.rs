// Shared fixtures for the integration tests.

pub mod bootstrap_tests;

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use restock_watcher::models::{MessagingCredentials, RetailerTable, Settings, WatchedItem};
use restock_watcher::plugins::traits::{
    NotificationReceipt, Notifier, PageProber, ProbeRequest, SmsMessage,
};
use restock_watcher::{AppError, CheckOutcome, CheckReport, Monitor, ProbeSettings, SettingsStore};

/// What the fake prober answers for a given URL.
#[derive(Debug, Clone, Copy)]
pub enum PageState {
    Available,
    SoldOut,
    Broken,
}

/// Prober backed by a fixed URL -> state table. Unlisted URLs are sold out.
#[derive(Default)]
pub struct FakeProber {
    pages: Mutex<HashMap<String, PageState>>,
    probes: Mutex<Vec<String>>,
}

impl FakeProber {
    pub fn with_pages(pages: &[(&str, PageState)]) -> Self {
        let prober = Self::default();
        for (url, state) in pages {
            prober.set(url, *state);
        }
        prober
    }

    pub fn set(&self, url: &str, state: PageState) {
        self.pages.lock().unwrap().insert(url.to_string(), state);
    }

    pub fn probes(&self) -> Vec<String> {
        self.probes.lock().unwrap().clone()
    }

    pub fn probe_count(&self, url: &str) -> usize {
        self.probes().iter().filter(|u| u.as_str() == url).count()
    }
}

#[async_trait]
impl PageProber for FakeProber {
    async fn probe(&self, request: &ProbeRequest) -> restock_watcher::Result<bool> {
        let url = request.url.to_string();
        self.probes.lock().unwrap().push(url.clone());

        let state = self
            .pages
            .lock()
            .unwrap()
            .get(&url)
            .copied()
            .unwrap_or(PageState::SoldOut);

        match state {
            PageState::Available => Ok(true),
            PageState::SoldOut => Ok(false),
            PageState::Broken => Err(AppError::Browser(format!("Navigation failed: {}", url))),
        }
    }
}

/// Notifier that records messages and optionally fails every send.
#[derive(Default)]
pub struct FakeNotifier {
    sent: Mutex<Vec<SmsMessage>>,
    attempts: AtomicUsize,
    fail: bool,
}

impl FakeNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<SmsMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send(
        &self,
        _credentials: &MessagingCredentials,
        message: &SmsMessage,
    ) -> restock_watcher::Result<NotificationReceipt> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Notification {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(NotificationReceipt {
            message_id: Some("SM-test".to_string()),
        })
    }
}

pub fn test_retailers() -> RetailerTable {
    let mut selectors = BTreeMap::new();
    selectors.insert("acme".to_string(), "#buy-button".to_string());
    selectors.insert("bestbuy".to_string(), ".add-to-cart-button".to_string());
    RetailerTable::new(selectors).expect("valid retailer table")
}

pub fn test_settings(items: Vec<WatchedItem>) -> Settings {
    Settings {
        phone: "+15551234567".to_string(),
        twilio: MessagingCredentials {
            sid: "AC123".to_string(),
            token: "secret".to_string(),
            number: "+15557654321".to_string(),
        },
        items,
        interval: None,
    }
}

pub struct Harness {
    pub store: Arc<SettingsStore>,
    pub prober: Arc<FakeProber>,
    pub notifier: Arc<FakeNotifier>,
    pub monitor: Monitor,
}

pub fn harness(store: SettingsStore, prober: FakeProber, notifier: FakeNotifier) -> Harness {
    let store = Arc::new(store);
    let prober = Arc::new(prober);
    let notifier = Arc::new(notifier);

    let monitor = Monitor::new(
        Arc::clone(&store),
        Arc::new(test_retailers()),
        Arc::clone(&prober) as Arc<dyn PageProber>,
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        ProbeSettings {
            user_agent: "RestockWatcher-Test/1.0".to_string(),
            timeout: Duration::from_millis(5000),
        },
    );

    Harness {
        store,
        prober,
        notifier,
        monitor,
    }
}

pub fn outcomes(reports: Vec<CheckReport>) -> Vec<CheckOutcome> {
    reports.into_iter().map(|report| report.outcome).collect()
}

/// Detached notification tasks need a moment to run.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
}

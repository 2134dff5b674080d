use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use restock_watcher::bootstrap::ensure_settings;
use restock_watcher::config::{AppConfig, ProviderKind};
use restock_watcher::models::settings::load_template;
use restock_watcher::plugins::notifiers::TwilioNotifier;
use restock_watcher::scraper::ChromeProber;
use restock_watcher::setup::{ConfigurationProvider, EnvProvider, TerminalWizard};
use restock_watcher::utils::logging;
use restock_watcher::{Monitor, ProbeSettings, RetailerTable, SettingsStore};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    let _log_guard = logging::init(&config.logging)?;

    info!("Starting Restock Watcher...");

    let retailers = RetailerTable::load(config.settings.retailers_path().as_deref())?;
    let template = load_template(config.settings.template_path().as_deref())?;
    info!("Loaded {} retailers", retailers.len());

    // Setup may block on the terminal.
    let settings_path = config.settings.path();
    let provider_kind = config.setup.provider;
    let (settings, retailers) = tokio::task::spawn_blocking(move || {
        let mut provider: Box<dyn ConfigurationProvider> = match provider_kind {
            ProviderKind::Terminal => Box::new(TerminalWizard::stdio()),
            ProviderKind::Env => Box::new(EnvProvider::new()),
        };
        ensure_settings(&settings_path, &template, &retailers, provider.as_mut())
            .map(|(settings, origin)| {
                info!(?origin, "Watching {} items", settings.items.len());
                (settings, retailers)
            })
    })
    .await??;

    let store = Arc::new(SettingsStore::new(
        config.settings.path(),
        settings,
        config.settings.persist_on_change,
    ));

    // No browser, nothing to watch with.
    let prober = ChromeProber::launch(&config.browser)?;
    let notifier = TwilioNotifier::new(&config.notifier)?;

    let monitor = Monitor::new(
        store,
        Arc::new(retailers),
        Arc::new(prober),
        Arc::new(notifier),
        ProbeSettings::from(&config.browser),
    );

    monitor
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!("Shutting down...");
    Ok(())
}

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 11_1_0) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/87.0.4280.88 Safari/537.36";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub settings: SettingsConfig,
    pub browser: BrowserConfig,
    pub notifier: NotifierConfig,
    pub setup: SetupConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    pub path: String,
    pub template_path: Option<String>,
    pub retailers_path: Option<String>,
    /// Rewrite the settings file whenever an item flips to in stock.
    pub persist_on_change: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    pub user_agent: String,
    pub chrome_path: Option<String>,
    pub headless: bool,
    pub sandbox: bool,
    pub probe_timeout_ms: u64,
    pub navigation_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Terminal,
    Env,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupConfig {
    pub provider: ProviderKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
    pub directory: Option<String>,
}

impl SettingsConfig {
    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }

    pub fn template_path(&self) -> Option<PathBuf> {
        self.template_path.as_ref().map(PathBuf::from)
    }

    pub fn retailers_path(&self) -> Option<PathBuf> {
        self.retailers_path.as_ref().map(PathBuf::from)
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local config (ignored by git)
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("RESTOCK").separator("__"))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        if config.browser.chrome_path.is_none() {
            config.browser.chrome_path = env::var("CHROME_PATH").ok();
        }

        config.validate()?;
        Ok(config)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("settings.path", "config.json")?
            .set_default("settings.persist_on_change", true)?
            .set_default("browser.user_agent", DEFAULT_USER_AGENT)?
            .set_default("browser.headless", true)?
            .set_default("browser.sandbox", false)?
            .set_default("browser.probe_timeout_ms", 5000)?
            .set_default("browser.navigation_timeout_secs", 30)?
            .set_default("notifier.api_base_url", "https://api.twilio.com")?
            .set_default("notifier.request_timeout_secs", 15)?
            .set_default("setup.provider", "terminal")?
            .set_default("logging.filter", "restock_watcher=info")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.settings.path.trim().is_empty() {
            return Err(ConfigError::Message("Settings path must not be empty".into()));
        }

        if self.browser.user_agent.trim().is_empty() {
            return Err(ConfigError::Message("Browser user_agent must not be empty".into()));
        }

        if self.browser.probe_timeout_ms == 0 {
            return Err(ConfigError::Message("Browser probe_timeout_ms must be greater than 0".into()));
        }

        if self.browser.navigation_timeout_secs == 0 {
            return Err(ConfigError::Message("Browser navigation_timeout_secs must be greater than 0".into()));
        }

        if Url::parse(&self.notifier.api_base_url).is_err() {
            return Err(ConfigError::Message("Invalid notifier api_base_url format".into()));
        }

        if self.notifier.request_timeout_secs == 0 {
            return Err(ConfigError::Message("Notifier request_timeout_secs must be greater than 0".into()));
        }

        Ok(())
    }
}

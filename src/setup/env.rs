use config::{Config, Environment};
use serde::Deserialize;
use validator::Validate;

use super::{normalize_retailer, ConfigurationProvider, SetupAnswers};
use crate::models::{MessagingCredentials, RetailerTable, Settings, WatchedItem};
use crate::utils::error::{AppError, Result};

const ENV_PREFIX: &str = "RESTOCK_SETUP";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EnvSetup {
    phone: Option<String>,
    twilio_sid: Option<String>,
    twilio_token: Option<String>,
    twilio_number: Option<String>,
    item_name: Option<String>,
    item_type: Option<String>,
    item_url: Option<String>,
    interval: Option<String>,
}

/// Non-interactive setup from `RESTOCK_SETUP_*` variables, e.g.
/// `RESTOCK_SETUP_PHONE` or `RESTOCK_SETUP_TWILIO_SID`. Unset variables keep
/// the base value; the result must be complete.
#[derive(Debug, Default)]
pub struct EnvProvider {
    vars: Option<config::Map<String, String>>,
}

impl EnvProvider {
    /// Reads the process environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the given variables instead of the process environment.
    pub fn with_vars(vars: config::Map<String, String>) -> Self {
        Self { vars: Some(vars) }
    }

    fn read(&self) -> Result<EnvSetup> {
        let source = Environment::with_prefix(ENV_PREFIX)
            .ignore_empty(true)
            .source(self.vars.clone());
        let config = Config::builder().add_source(source).build()?;
        Ok(config.try_deserialize()?)
    }
}

impl ConfigurationProvider for EnvProvider {
    fn configure(&mut self, mut base: Settings, retailers: &RetailerTable) -> Result<Settings> {
        let env = self.read()?;

        if let Some(raw) = env.interval {
            let interval = raw.trim().parse::<u64>().map_err(|_| {
                AppError::Validation(format!(
                    "{}_INTERVAL must be a number of milliseconds, got '{}'",
                    ENV_PREFIX, raw
                ))
            })?;
            base.interval = Some(interval);
        }

        let first_item = match (env.item_name, env.item_type, env.item_url) {
            (Some(name), Some(retailer), Some(url)) if base.items.is_empty() => {
                Some(WatchedItem::new(name, normalize_retailer(&retailer, retailers)?, url))
            }
            _ => None,
        };

        let answers = SetupAnswers {
            phone: env.phone.unwrap_or_else(|| base.phone.clone()),
            credentials: MessagingCredentials {
                sid: env.twilio_sid.unwrap_or_else(|| base.twilio.sid.clone()),
                token: env.twilio_token.unwrap_or_else(|| base.twilio.token.clone()),
                number: env.twilio_number.unwrap_or_else(|| base.twilio.number.clone()),
            },
            first_item,
        };

        let settings = answers.apply(base);
        settings.validate()?;
        Ok(settings)
    }
}

//! First-run configuration.
//!
//! A [`ConfigurationProvider`] turns a partially filled [`Settings`] into a
//! complete one. [`TerminalWizard`] asks the operator interactively;
//! [`EnvProvider`] reads `RESTOCK_SETUP_*` variables for unattended deployments.

pub mod env;
pub mod wizard;

pub use env::EnvProvider;
pub use wizard::TerminalWizard;

use crate::models::{MessagingCredentials, RetailerTable, Settings, WatchedItem};
use crate::utils::error::{AppError, Result};

pub trait ConfigurationProvider {
    /// Fills in `base` and returns the settings to persist.
    fn configure(&mut self, base: Settings, retailers: &RetailerTable) -> Result<Settings>;
}

/// Values gathered by a provider, applied on top of the base settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupAnswers {
    pub phone: String,
    pub credentials: MessagingCredentials,
    /// Only collected when the base has no items.
    pub first_item: Option<WatchedItem>,
}

impl SetupAnswers {
    /// Answers always replace phone and credentials. The item is only added
    /// when the base list is empty; existing items are never touched.
    pub fn apply(self, mut base: Settings) -> Settings {
        base.phone = self.phone;
        base.twilio = self.credentials;
        if base.items.is_empty() {
            if let Some(item) = self.first_item {
                base.items.push(item);
            }
        }
        base
    }
}

/// Lowercases retailer input and checks it against the known keys.
pub fn normalize_retailer(input: &str, retailers: &RetailerTable) -> Result<String> {
    let retailer = input.trim().to_lowercase();
    if retailers.contains(&retailer) {
        Ok(retailer)
    } else {
        Err(AppError::Validation(format!(
            "Retailer must be one of: {}",
            retailers.describe_keys()
        )))
    }
}

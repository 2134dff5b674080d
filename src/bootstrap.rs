use serde_json::Value;
use std::path::Path;
use validator::Validate;

use crate::models::settings::read_raw;
use crate::models::{RetailerTable, Settings};
use crate::setup::ConfigurationProvider;
use crate::utils::error::Result;

/// Where the settings handed to the monitor came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsOrigin {
    /// The file on disk was already complete.
    Existing,
    /// Setup ran and wrote the file.
    Configured,
}

/// Returns usable settings, running `provider` first when the file at `path`
/// is missing, malformed or incomplete.
///
/// Whatever the incomplete file does hold is layered over `template` and
/// offered to the provider as defaults. The provider's result overwrites the
/// file.
pub fn ensure_settings(
    path: &Path,
    template: &Value,
    retailers: &RetailerTable,
    provider: &mut dyn ConfigurationProvider,
) -> Result<(Settings, SettingsOrigin)> {
    let existing = read_raw(path);

    if let Some(raw) = &existing {
        if let Ok(settings) = serde_json::from_value::<Settings>(raw.clone()) {
            if settings.is_complete() {
                tracing::info!("Loaded settings from {}", path.display());
                return Ok((settings, SettingsOrigin::Existing));
            }
        }
    }

    tracing::info!("Settings at {} are incomplete; running setup", path.display());

    let base = Settings::layered(template, existing.as_ref()).or_else(|e| {
        tracing::warn!(error = %e, "Ignoring unusable partial settings");
        Settings::layered(template, None)
    })?;

    let settings = provider.configure(base, retailers)?;
    settings.validate()?;
    settings.save(path)?;

    tracing::info!("Saved settings to {}", path.display());
    Ok((settings, SettingsOrigin::Configured))
}

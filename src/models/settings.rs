use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use validator::Validate;

use crate::utils::error::Result;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 120_000;

const DEFAULT_TEMPLATE: &str = include_str!("../../assets/settings-default.json");

/// Twilio account used to send alerts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MessagingCredentials {
    #[validate(length(min = 1, message = "Twilio SID is required"))]
    pub sid: String,
    #[validate(length(min = 1, message = "Twilio token is required"))]
    pub token: String,
    /// Number the alert is sent from, E.164.
    #[validate(length(min = 1, message = "Twilio number is required"))]
    pub number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchedItem {
    pub name: String,
    /// Key into the retailer selector table.
    #[serde(rename = "type")]
    pub retailer: String,
    pub url: String,
    #[serde(rename = "inStock")]
    pub in_stock: bool,
}

impl WatchedItem {
    pub fn new(name: impl Into<String>, retailer: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            retailer: retailer.into(),
            url: url.into(),
            in_stock: false,
        }
    }
}

/// Everything the watcher needs at runtime, persisted as a flat JSON file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    /// Number that receives alerts, E.164.
    #[validate(length(min = 1, message = "phone number is required"))]
    pub phone: String,
    #[validate(nested)]
    pub twilio: MessagingCredentials,
    #[validate(length(min = 1, message = "at least one watched item is required"))]
    pub items: Vec<WatchedItem>,
    /// Milliseconds between sweeps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,
}

impl Settings {
    /// True when the watcher can start without running setup.
    pub fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }

    /// Zero or missing falls back to the two minute default.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(
            self.interval
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
        )
    }

    /// Shallow merge of `existing` over `template`. Top-level keys present in
    /// `existing` replace the template's wholesale, nulls are ignored.
    pub fn layered(template: &Value, existing: Option<&Value>) -> Result<Self> {
        let mut merged = match template {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };

        if let Some(Value::Object(existing)) = existing {
            for (key, value) in existing {
                if !value.is_null() {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(serde_json::from_value(Value::Object(merged))?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        write_atomic(path, &self.to_json()?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Sibling path the new contents are staged at before replacing `path`.
pub(crate) fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "settings.json".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

/// Replaces `path` with `contents` via write-then-rename, so readers see the
/// old file or the new one and never a partial write.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let staging = staging_path(path);
    std::fs::write(&staging, contents)?;
    std::fs::rename(&staging, path)?;
    Ok(())
}

/// Reads the settings file as loose JSON so partial files can still seed setup.
/// Missing or unparsable files yield `None`.
pub fn read_raw(path: &Path) -> Option<Value> {
    let text = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}

/// Template used as the base layer when setup runs. Falls back to the bundled
/// copy when no override is given.
pub fn load_template(path: Option<&Path>) -> Result<Value> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => DEFAULT_TEMPLATE.to_string(),
    };
    Ok(serde_json::from_str(&text)?)
}

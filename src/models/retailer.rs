use std::collections::BTreeMap;
use std::path::Path;

use crate::utils::error::{AppError, Result};

const BUNDLED_RETAILERS: &str = include_str!("../../assets/retailers.json");

/// Maps a retailer key to the CSS selector of that site's buy button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetailerTable {
    selectors: BTreeMap<String, String>,
}

impl RetailerTable {
    pub fn bundled() -> Result<Self> {
        Self::from_json_str(BUNDLED_RETAILERS)
    }

    /// Loads the override file when given, the bundled table otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_json_str(&std::fs::read_to_string(path)?),
            None => Self::bundled(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let selectors: BTreeMap<String, String> = serde_json::from_str(json)?;
        Self::new(selectors)
    }

    pub fn new(selectors: BTreeMap<String, String>) -> Result<Self> {
        if let Some((key, _)) = selectors.iter().find(|(_, s)| s.trim().is_empty()) {
            return Err(AppError::Validation(format!(
                "Retailer '{}' has an empty selector",
                key
            )));
        }
        Ok(Self { selectors })
    }

    pub fn selector_for(&self, retailer: &str) -> Option<&str> {
        self.selectors.get(retailer).map(String::as_str)
    }

    pub fn contains(&self, retailer: &str) -> bool {
        self.selectors.contains_key(retailer)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.selectors.keys().map(String::as_str).collect()
    }

    pub fn describe_keys(&self) -> String {
        self.keys().join(", ")
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

use async_trait::async_trait;
use std::time::Duration;
use url::Url;

use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub url: Url,
    /// CSS selector that must be present and visible.
    pub selector: String,
    pub user_agent: String,
    /// How long to wait for the selector once the page has loaded.
    pub timeout: Duration,
}

/// Loads a page and reports whether a selector shows up on it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageProber: Send + Sync {
    /// `Ok(false)` when the selector never became visible within the timeout.
    /// Errors are reserved for failures to load the page at all.
    async fn probe(&self, request: &ProbeRequest) -> Result<bool>;
}

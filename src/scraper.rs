use async_trait::async_trait;
use headless_chrome::protocol::cdp::Target;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::BrowserConfig;
use crate::plugins::traits::{PageProber, ProbeRequest};
use crate::utils::error::{AppError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

// Chrome is otherwise torn down after 30s without DevTools traffic, which is
// shorter than a sweep interval.
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(60 * 60 * 24 * 365);

// Same checks as puppeteer's `visible: true`: rendered, not hidden, non-empty box.
const IS_VISIBLE_JS: &str = r#"
function() {
    const style = window.getComputedStyle(this);
    const rect = this.getBoundingClientRect();
    return !!style && style.visibility !== 'hidden'
        && !!(rect.top || rect.bottom || rect.width || rect.height);
}
"#;

/// Probes pages in a single long-lived headless Chrome.
pub struct ChromeProber {
    browser: Browser,
    /// Tab in the default context used for browser-wide DevTools calls.
    control: Arc<Tab>,
    navigation_timeout: Duration,
}

fn launch_args(config: &BrowserConfig) -> Vec<&'static OsStr> {
    let mut args = vec![
        OsStr::new("--disable-dev-shm-usage"),
        OsStr::new("--disable-gpu"),
        OsStr::new("--disable-extensions"),
    ];
    if !config.sandbox {
        args.push(OsStr::new("--no-sandbox"));
    }
    args
}

impl ChromeProber {
    /// Launch failures are fatal to the caller; there is nothing to probe with.
    pub fn launch(config: &BrowserConfig) -> Result<Self> {
        let mut launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .sandbox(config.sandbox)
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
            .args(launch_args(config))
            .build()
            .map_err(|e| AppError::Browser(format!("Failed to create launch options: {}", e)))?;

        if let Some(chrome_path) = &config.chrome_path {
            launch_options.path = Some(std::path::PathBuf::from(chrome_path));
        }

        let browser = Browser::new(launch_options)
            .map_err(|e| AppError::Browser(format!("Failed to launch browser: {}", e)))?;
        let control = browser
            .new_tab()
            .map_err(|e| AppError::Browser(format!("Failed to open control tab: {}", e)))?;

        tracing::info!("Launched headless browser");
        Ok(Self {
            browser,
            control,
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
        })
    }

    fn probe_blocking(
        browser: &Browser,
        control: &Tab,
        request: &ProbeRequest,
        navigation_timeout: Duration,
    ) -> Result<bool> {
        let context = browser
            .new_context()
            .map_err(|e| AppError::Browser(format!("Failed to create browser context: {}", e)))?;
        let context_id = context.get_id().to_string();

        let result = context
            .new_tab()
            .map_err(|e| AppError::Browser(format!("Failed to create tab: {}", e)))
            .and_then(|tab| {
                let result = Self::load_and_wait(&tab, request, navigation_timeout);
                if let Err(e) = tab.close(true) {
                    tracing::debug!("Failed to close tab for {}: {}", request.url, e);
                }
                result
            });

        // Contexts outlive their tabs until disposed.
        if let Err(e) = Self::dispose_context(control, context_id) {
            tracing::debug!("Failed to dispose browser context for {}: {}", request.url, e);
        }

        result
    }

    fn dispose_context(control: &Tab, context_id: String) -> anyhow::Result<()> {
        control.call_method(Target::DisposeBrowserContext {
            browser_context_id: context_id,
        })?;
        Ok(())
    }

    /// Ids of the isolated contexts still alive in the browser.
    #[cfg(test)]
    fn open_contexts(&self) -> Result<Vec<String>> {
        self.control
            .call_method(Target::GetBrowserContexts(None))
            .map(|contexts| contexts.browser_context_ids)
            .map_err(|e| AppError::Browser(format!("Failed to list browser contexts: {}", e)))
    }

    fn load_and_wait(tab: &Arc<Tab>, request: &ProbeRequest, navigation_timeout: Duration) -> Result<bool> {
        tab.set_default_timeout(navigation_timeout);

        tab.set_user_agent(&request.user_agent, None, None)
            .map_err(|e| AppError::Browser(format!("Failed to set user agent: {}", e)))?;

        tab.navigate_to(request.url.as_str())
            .map_err(|e| AppError::Browser(format!("Navigation failed: {}", e)))?;

        tab.wait_until_navigated()
            .map_err(|e| AppError::Browser(format!("Page load failed: {}", e)))?;

        Ok(Self::wait_for_visible(tab, &request.selector, request.timeout))
    }

    /// Polls until an element matching `selector` is visible. Anything short
    /// of that, including an unparsable selector, counts as not found.
    fn wait_for_visible(tab: &Tab, selector: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;

        loop {
            if let Ok(elements) = tab.find_elements(selector) {
                if elements.iter().any(Self::is_visible) {
                    return true;
                }
            }

            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    fn is_visible(element: &Element<'_>) -> bool {
        element
            .call_js_fn(IS_VISIBLE_JS, Vec::new(), false)
            .ok()
            .and_then(|object| object.value)
            .and_then(|value| value.as_bool())
            .unwrap_or(false)
    }
}

#[async_trait]
impl PageProber for ChromeProber {
    async fn probe(&self, request: &ProbeRequest) -> Result<bool> {
        let browser = self.browser.clone();
        let control = Arc::clone(&self.control);
        let request = request.clone();
        let navigation_timeout = self.navigation_timeout;

        // headless_chrome blocks on every DevTools round trip.
        tokio::task::spawn_blocking(move || {
            Self::probe_blocking(&browser, &control, &request, navigation_timeout)
        })
            .await
            .map_err(|e| AppError::Browser(format!("Probe task failed: {}", e)))?
    }
}

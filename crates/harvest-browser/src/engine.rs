//! Chromium-backed browser sessions.

use crate::actions::{BrowserDriver, BrowserSession, LaunchOptions, NavigateOptions, WaitUntil};
use crate::content::PageContent;
use crate::error::{BrowserError, Result};
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Extra pause after the load event when waiting for network idle.
const NETWORK_SETTLE: Duration = Duration::from_millis(500);

/// Interval between selector and ready-state checks.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

const READY_STATE_JS: &str = "document.readyState";

const VISIBLE_TEXT_JS: &str = "document.body ? document.body.innerText : ''";

const ANCHOR_HREFS_JS: &str =
    "Array.from(document.querySelectorAll('a[href]')).map(a => a.getAttribute('href'))";

/// Launches a local Chromium for each session.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromiumDriver;

impl ChromiumDriver {
    pub fn new() -> Self {
        Self
    }

    fn chrome_config(options: &LaunchOptions) -> Result<ChromeConfig> {
        Self::chrome_builder(options)
            .build()
            .map_err(BrowserError::LaunchFailed)
    }

    fn chrome_builder(options: &LaunchOptions) -> chromiumoxide::browser::BrowserConfigBuilder {
        let fingerprint = &options.fingerprint;

        let mut builder = ChromeConfig::builder()
            .no_sandbox()
            .window_size(fingerprint.viewport_width, fingerprint.viewport_height)
            .arg(format!("--user-agent={}", fingerprint.user_agent));

        if !options.headless {
            builder = builder.with_head();
        }
        for arg in &options.extra_args {
            builder = builder.arg(arg.clone());
        }
        builder
    }
}

#[async_trait::async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn launch(&self, options: &LaunchOptions) -> Result<Box<dyn BrowserSession>> {
        let config = Self::chrome_config(options)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("chromium handler event error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler_task.abort();
                return Err(BrowserError::LaunchFailed(e.to_string()));
            }
        };

        tracing::debug!(
            headless = options.headless,
            user_agent = %options.fingerprint.user_agent,
            "launched chromium session"
        );

        Ok(Box::new(ChromiumSession {
            browser: Some(browser),
            page: Some(page),
            handler: Some(handler_task),
        }))
    }
}

/// A Chromium process with a single page.
pub struct ChromiumSession {
    browser: Option<Browser>,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
}

impl ChromiumSession {
    fn page(&self) -> Result<&Page> {
        self.page.as_ref().ok_or(BrowserError::SessionClosed)
    }
}

#[async_trait::async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, url: &str, options: NavigateOptions) -> Result<()> {
        let page = self.page()?;

        let load = async {
            match options.wait_until {
                WaitUntil::DomContentLoaded => {
                    let response = page
                        .execute(NavigateParams::new(url))
                        .await
                        .map_err(|e| BrowserError::NavigationError(format!("{url}: {e}")))?;
                    if let Some(error) = response.result.error_text.as_deref() {
                        return Err(BrowserError::NavigationError(format!("{url}: {error}")));
                    }
                    wait_for_dom(page).await;
                }
                WaitUntil::NetworkIdle => {
                    // goto resolves on the load event
                    page.goto(url)
                        .await
                        .map_err(|e| BrowserError::NavigationError(format!("{url}: {e}")))?;
                    tokio::time::sleep(NETWORK_SETTLE).await;
                }
            }
            Ok::<(), BrowserError>(())
        };

        tokio::time::timeout(options.timeout, load)
            .await
            .map_err(|_| {
                BrowserError::Timeout(format!(
                    "{url} after {}ms",
                    options.timeout.as_millis()
                ))
            })?
    }

    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        let page = self.page()?;
        let deadline = Instant::now() + timeout;

        loop {
            if page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::SelectorNotFound(selector.to_string()));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn capture(&mut self) -> Result<PageContent> {
        let page = self.page()?;

        let html = page
            .content()
            .await
            .map_err(|e| BrowserError::EvaluationError(e.to_string()))?;

        let visible_text: String = page
            .evaluate(VISIBLE_TEXT_JS)
            .await
            .map_err(|e| BrowserError::EvaluationError(e.to_string()))?
            .into_value()
            .map_err(|e| BrowserError::EvaluationError(e.to_string()))?;

        let anchor_hrefs: Vec<String> = page
            .evaluate(ANCHOR_HREFS_JS)
            .await
            .map_err(|e| BrowserError::EvaluationError(e.to_string()))?
            .into_value()
            .map_err(|e| BrowserError::EvaluationError(e.to_string()))?;

        let url = page
            .url()
            .await
            .map_err(|e| BrowserError::EvaluationError(e.to_string()))?
            .unwrap_or_default();

        Ok(PageContent {
            url,
            html,
            visible_text,
            anchor_hrefs,
        })
    }

    async fn close(&mut self) -> Result<()> {
        self.page = None;

        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };

        let closed = browser
            .close()
            .await
            .map_err(|e| BrowserError::LaunchFailed(format!("close failed: {e}")));
        if closed.is_ok() {
            let _ = browser.wait().await;
        }

        if let Some(handler) = self.handler.take() {
            handler.abort();
        }

        tracing::debug!("closed chromium session");
        closed.map(|_| ())
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}

/// Whether a `document.readyState` value means DOMContentLoaded has fired.
fn is_dom_ready(state: &str) -> bool {
    matches!(state, "interactive" | "complete")
}

/// Poll the ready state of the committed document until its DOM is parsed.
/// The caller bounds this with the navigation timeout.
async fn wait_for_dom(page: &Page) {
    loop {
        let state = match page.evaluate(READY_STATE_JS).await {
            Ok(result) => result.into_value::<String>().ok(),
            Err(e) => {
                tracing::trace!("ready state check failed: {}", e);
                None
            }
        };
        if state.as_deref().is_some_and(is_dom_ready) {
            return;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

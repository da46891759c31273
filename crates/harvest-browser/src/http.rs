//! Plain HTTP sessions for hosts without a browser.
//!
//! Pages are fetched with reqwest and parsed with scraper, so scripts never
//! run. Search engines that render results client-side will not work here.

use crate::actions::{BrowserDriver, BrowserSession, LaunchOptions, NavigateOptions};
use crate::content::PageContent;
use crate::error::{BrowserError, Result};
use reqwest::Client;
use std::time::Duration;

/// Fetches pages over HTTP, one cookie jar per session.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpDriver;

impl HttpDriver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl BrowserDriver for HttpDriver {
    async fn launch(&self, options: &LaunchOptions) -> Result<Box<dyn BrowserSession>> {
        let client = Client::builder()
            .user_agent(options.fingerprint.user_agent.clone())
            .cookie_store(true)
            .build()
            .map_err(|e| BrowserError::LaunchFailed(format!("failed to create HTTP client: {e}")))?;

        tracing::debug!(user_agent = %options.fingerprint.user_agent, "launched http session");

        Ok(Box::new(HttpSession {
            client: Some(client),
            current: None,
        }))
    }
}

/// Session state: the client and the last loaded page.
pub struct HttpSession {
    client: Option<Client>,
    current: Option<PageContent>,
}

impl HttpSession {
    fn client(&self) -> Result<&Client> {
        self.client.as_ref().ok_or(BrowserError::SessionClosed)
    }
}

#[async_trait::async_trait]
impl BrowserSession for HttpSession {
    async fn navigate(&mut self, url: &str, options: NavigateOptions) -> Result<()> {
        let client = self.client()?;

        let response = client
            .get(url)
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|e| classify(url, options.timeout, e))?;

        // Error statuses still carry a page, same as in a browser.
        let status = response.status();
        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| classify(url, options.timeout, e))?;

        tracing::trace!(%status, url = %final_url, bytes = body.len(), "fetched page");

        self.current = Some(PageContent::from_html(final_url, body));
        Ok(())
    }

    async fn wait_for_selector(&mut self, selector: &str, _timeout: Duration) -> Result<()> {
        self.client()?;

        // Static HTML never changes after load, one check is enough.
        let found = match &self.current {
            Some(page) => page.has_element(selector)?,
            None => false,
        };
        if found {
            Ok(())
        } else {
            Err(BrowserError::SelectorNotFound(selector.to_string()))
        }
    }

    async fn capture(&mut self) -> Result<PageContent> {
        self.client()?;

        Ok(self.current.clone().unwrap_or_else(|| PageContent {
            url: "about:blank".to_string(),
            ..PageContent::default()
        }))
    }

    async fn close(&mut self) -> Result<()> {
        if self.client.take().is_some() {
            tracing::debug!("closed http session");
        }
        self.current = None;
        Ok(())
    }
}

fn classify(url: &str, timeout: Duration, err: reqwest::Error) -> BrowserError {
    if err.is_timeout() {
        BrowserError::Timeout(format!("{url} after {}ms", timeout.as_millis()))
    } else {
        BrowserError::NavigationError(format!("{url}: {err}"))
    }
}

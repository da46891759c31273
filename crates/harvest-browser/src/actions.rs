use crate::content::PageContent;
use crate::error::Result;
use crate::fingerprint::FingerprintConfig;
use harvest_core::BrowserConfig;
use std::time::Duration;

/// Load state a navigation waits for before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitUntil {
    /// The DOM has been parsed
    #[default]
    DomContentLoaded,
    /// The page has loaded and network activity has settled
    NetworkIdle,
}

/// Options for a single navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigateOptions {
    pub timeout: Duration,
    pub wait_until: WaitUntil,
}

impl NavigateOptions {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            wait_until: WaitUntil::default(),
        }
    }

    #[must_use]
    pub fn wait_until(mut self, wait_until: WaitUntil) -> Self {
        self.wait_until = wait_until;
        self
    }
}

/// Options for launching a session.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub fingerprint: FingerprintConfig,
    pub headless: bool,
    pub extra_args: Vec<String>,
}

impl LaunchOptions {
    pub fn from_config(config: &BrowserConfig) -> Self {
        Self {
            fingerprint: FingerprintConfig::from_config(config),
            headless: config.headless,
            extra_args: config.extra_args.clone(),
        }
    }
}

/// Launches browser sessions.
///
/// The orchestrator depends only on this trait, so a full renderer and a
/// plain HTTP fetcher can be swapped per deployment.
#[async_trait::async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Start a session with one navigable page.
    async fn launch(&self, options: &LaunchOptions) -> Result<Box<dyn BrowserSession>>;
}

/// One browser session owning a single navigable page.
#[async_trait::async_trait]
pub trait BrowserSession: Send {
    /// Navigate the page to a URL
    async fn navigate(&mut self, url: &str, options: NavigateOptions) -> Result<()>;

    /// Wait for a selector to appear on the current page
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<()>;

    /// Evaluate the current page into a content snapshot
    async fn capture(&mut self) -> Result<PageContent>;

    /// Release the session. Calling this more than once is a no-op.
    async fn close(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigate_options_builder() {
        let options =
            NavigateOptions::new(Duration::from_secs(5)).wait_until(WaitUntil::NetworkIdle);
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(options.wait_until, WaitUntil::NetworkIdle);
        assert_eq!(
            NavigateOptions::new(Duration::from_secs(1)).wait_until,
            WaitUntil::DomContentLoaded
        );
    }

    #[test]
    fn test_launch_options_from_config() {
        let config = BrowserConfig {
            headless: false,
            user_agent: Some("HarvestTest/1.0".to_string()),
            ..BrowserConfig::default()
        };
        let options = LaunchOptions::from_config(&config);
        assert!(!options.headless);
        assert_eq!(options.fingerprint.user_agent, "HarvestTest/1.0");
        assert_eq!(options.extra_args, vec!["--disable-setuid-sandbox".to_string()]);
    }
}

//! Application state management.

use anyhow::{Context, Result};
use harvest_browser::{BrowserDriver, ChromiumDriver, HttpDriver};
use harvest_core::{AppConfig, BrowserEngineKind};
use harvest_scanner::ScrapeOrchestrator;
use std::sync::Arc;

/// Everything a run needs: configuration and the orchestrator built from it.
pub struct AppState {
    pub config: AppConfig,
    pub orchestrator: ScrapeOrchestrator,
}

impl AppState {
    /// Build state with the browser engine named in `config`.
    pub fn new(config: AppConfig) -> Result<Self> {
        let driver: Arc<dyn BrowserDriver> = match config.browser.engine {
            BrowserEngineKind::Chromium => Arc::new(ChromiumDriver::new()),
            BrowserEngineKind::Http => Arc::new(HttpDriver::new()),
        };
        tracing::info!("Browser engine: {:?}", config.browser.engine);
        Self::with_driver(config, driver)
    }

    /// Build state around an explicit driver.
    pub fn with_driver(config: AppConfig, driver: Arc<dyn BrowserDriver>) -> Result<Self> {
        let orchestrator = ScrapeOrchestrator::new(driver, config.clone())
            .context("failed to create scrape orchestrator")?;
        Ok(Self {
            config,
            orchestrator,
        })
    }
}

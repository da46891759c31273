//! Configuration management for harvest.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

/// Main application configuration.
///
/// This is loaded from `~/.config/harvest/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Request defaults and orchestrator limits
    pub scraping: ScrapingConfig,
    /// Search engine endpoint and result selectors
    pub search: SearchConfig,
    /// Browser automation settings
    pub browser: BrowserConfig,
    /// Log filtering
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load and validate configuration from an explicit path.
    pub fn load_from(path: &std::path::Path) -> ConfigResult<Self> {
        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `HARVEST_HEADLESS`: Override browser headless mode (true/false)
    /// - `HARVEST_BROWSER_ENGINE`: Override browser engine (`chromium`/`http`)
    /// - `HARVEST_SEARCH_URL`: Override the search engine base URL
    /// - `HARVEST_MAX_CONCURRENT_RUNS`: Override the run gate size
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides using `lookup` to read variables.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("HARVEST_HEADLESS") {
            match val.parse() {
                Ok(headless) => {
                    self.browser.headless = headless;
                    tracing::debug!("Override browser.headless from env: {}", headless);
                }
                Err(_) => tracing::warn!("Ignoring invalid HARVEST_HEADLESS value: {}", val),
            }
        }

        if let Some(val) = lookup("HARVEST_BROWSER_ENGINE") {
            match val.parse() {
                Ok(engine) => {
                    self.browser.engine = engine;
                    tracing::debug!("Override browser.engine from env: {:?}", engine);
                }
                Err(e) => tracing::warn!("Ignoring HARVEST_BROWSER_ENGINE: {}", e),
            }
        }

        if let Some(val) = lookup("HARVEST_SEARCH_URL") {
            tracing::debug!("Override search.base_url from env: {}", val);
            self.search.base_url = val;
        }

        if let Some(val) = lookup("HARVEST_MAX_CONCURRENT_RUNS") {
            match val.parse() {
                Ok(runs) => {
                    self.scraping.max_concurrent_runs = runs;
                    tracing::debug!("Override scraping.max_concurrent_runs from env: {}", runs);
                }
                Err(_) => {
                    tracing::warn!("Ignoring invalid HARVEST_MAX_CONCURRENT_RUNS value: {}", val);
                }
            }
        }
    }

    /// Check values that would otherwise fail at run time.
    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |field: &str, reason: &str| ConfigError::InvalidValue {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        if self.scraping.results_per_page == 0 {
            return Err(invalid("scraping.results_per_page", "must be at least 1"));
        }
        if self.scraping.max_concurrent_runs == 0 {
            return Err(invalid("scraping.max_concurrent_runs", "must be at least 1"));
        }
        if self.scraping.event_buffer == 0 {
            return Err(invalid("scraping.event_buffer", "must be at least 1"));
        }
        if self.scraping.query_delimiter.is_empty() {
            return Err(invalid("scraping.query_delimiter", "must not be empty"));
        }
        if self.search.base_url.trim().is_empty() {
            return Err(invalid("search.base_url", "must not be empty"));
        }
        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/harvest/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "harvest", "harvest").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Request defaults and orchestrator limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// Sites per query when a request omits `limit`
    pub default_limit: usize,
    /// Lower delay bound in seconds when a request omits `minDelay`
    pub default_min_delay_secs: f64,
    /// Upper delay bound in seconds when a request omits `maxDelay`
    pub default_max_delay_secs: f64,
    /// Per-attempt timeout when a request omits `timeout`
    pub default_timeout_ms: u64,
    /// Attempts per site when a request omits `retries`
    pub default_retries: u32,
    /// Fixed wait between failed site attempts
    pub retry_backoff_ms: u64,
    /// Fixed pause after advancing to the next results page
    pub page_advance_pause_ms: u64,
    /// Results the search engine serves per page
    pub results_per_page: usize,
    /// Separator between queries in a request
    pub query_delimiter: String,
    /// Requests allowed in flight at once; others queue
    pub max_concurrent_runs: usize,
    /// Finished runs kept for snapshot reads
    pub max_retained_runs: usize,
    /// Capacity of each run's event channel
    pub event_buffer: usize,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            default_min_delay_secs: 2.0,
            default_max_delay_secs: 5.0,
            default_timeout_ms: 30_000,
            default_retries: 3,
            retry_backoff_ms: 5_000,
            page_advance_pause_ms: 1_000,
            results_per_page: 10,
            query_delimiter: ";".to_string(),
            max_concurrent_runs: 1,
            max_retained_runs: 32,
            event_buffer: 64,
        }
    }
}

/// Search engine endpoint and result page selectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Base URL; `q` and `start` parameters are appended
    pub base_url: String,
    /// Selector for one organic result container
    pub result_container_selector: String,
    /// Selector for the result link inside a container
    pub link_selector: String,
    /// Selector for the result heading inside a container
    pub title_selector: String,
    /// Selector for the "next page" control
    pub next_page_selector: String,
    /// Timeout for loading a results page
    pub navigation_timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.google.com/search".to_string(),
            result_container_selector: "div.g".to_string(),
            link_selector: "a".to_string(),
            title_selector: "h3".to_string(),
            next_page_selector: "a#pnnext".to_string(),
            navigation_timeout_secs: 30,
        }
    }
}

/// Which browser capability implementation to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserEngineKind {
    /// Headless Chromium via the DevTools protocol
    #[default]
    Chromium,
    /// Plain HTTP fetch with static HTML parsing
    Http,
}

impl FromStr for BrowserEngineKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Self::Chromium),
            "http" => Ok(Self::Http),
            other => Err(ConfigError::InvalidValue {
                field: "browser.engine".to_string(),
                reason: format!("unknown engine '{other}'"),
            }),
        }
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Capability implementation
    pub engine: BrowserEngineKind,
    /// Run browser in headless mode
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Fixed user agent; a randomized desktop one is used when unset
    pub user_agent: Option<String>,
    /// Extra command-line arguments for the browser process
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            engine: BrowserEngineKind::Chromium,
            headless: true,
            window_width: 1920,
            window_height: 1080,
            user_agent: None,
            extra_args: vec!["--disable-setuid-sandbox".to_string()],
        }
    }
}

/// Log filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,harvest=debug".to_string(),
        }
    }
}

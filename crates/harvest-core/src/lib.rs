//! Harvest Core - Foundation crate for the harvest scrape pipeline.
//!
//! This crate provides shared types, error handling and configuration
//! management that the browser, scanner and app crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Request model, run configuration and per-site results
//!
//! # Example
//!
//! ```rust
//! use harvest_core::{AppConfig, RunRequest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! let run = RunRequest::new("acme corp; widgets inc").resolve(&config.scraping)?;
//! assert_eq!(run.queries.len(), 2);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, BrowserConfig, BrowserEngineKind, LoggingConfig, ScrapingConfig, SearchConfig,
};
pub use error::{ConfigError, ConfigResult, HarvestError, Result};
pub use types::{
    parse_queries, ContactSet, Query, RunConfiguration, RunId, RunRequest, SearchResultLink,
    SiteExtractionResult, Timestamp,
};

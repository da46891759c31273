//! Browser capability interface for the harvest scrape pipeline.
//!
//! The scanner drives pages through [`BrowserDriver`] and [`BrowserSession`].
//! Two implementations ship here: [`ChromiumDriver`] renders pages in a
//! local Chromium, and [`HttpDriver`] fetches static HTML over reqwest.

pub mod actions;
pub mod content;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod http;

pub use actions::{BrowserDriver, BrowserSession, LaunchOptions, NavigateOptions, WaitUntil};
pub use content::PageContent;
pub use engine::ChromiumDriver;
pub use error::{BrowserError, Result};
pub use fingerprint::FingerprintConfig;
pub use http::HttpDriver;

//! Harvest Scanner - Contact extraction and scrape orchestration.
//!
//! This crate turns a search request into per-site contact results. It
//! paginates a search engine, visits each result on a browser session, and
//! extracts email addresses and phone numbers from the rendered pages.
//!
//! # Features
//!
//! - Multi-query requests run strictly in order on one session
//! - Randomized delays between page loads and fixed-delay retries per site
//! - Progress reported as a stream of [`ScrapeEvent`]s
//! - Per-run result snapshots keyed by [`RunId`](harvest_core::RunId)
//! - FIFO admission with a configurable number of concurrent runs
//!
//! # Example
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use harvest_browser::ChromiumDriver;
//! use harvest_core::{AppConfig, RunRequest};
//! use harvest_scanner::ScrapeOrchestrator;
//! use std::sync::Arc;
//!
//! let orchestrator = ScrapeOrchestrator::new(Arc::new(ChromiumDriver::new()), AppConfig::default())?;
//! let mut run = orchestrator.start(RunRequest::new("acme corp; widgets inc")).await?;
//!
//! while let Some(event) = run.events.next().await {
//!     println!("{}", serde_json::to_string(&event)?);
//! }
//! let snapshot = orchestrator.snapshot(&run.id).await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod events;
pub mod extractor;
pub mod orchestrator;
pub mod pacing;
pub mod retry;
pub mod runs;
pub mod serp;
#[allow(missing_docs)]
pub mod url_builder;

// Re-export commonly used types
pub use error::{Result, ScanError};
pub use events::{EventStream, ProgressTracker, ScrapeEvent, StreamOutcome, FATAL_ERROR_MESSAGE};
pub use extractor::{extract, ExtractedContacts};
pub use orchestrator::{ScrapeOrchestrator, ScrapeRun};
pub use pacing::{DelayRange, Pauses};
pub use retry::{retry_with_delay, RetryPolicy};
pub use runs::{RunRegistry, RunSnapshot, RunStatus};
pub use serp::SerpParser;
pub use url_builder::build_search_url;

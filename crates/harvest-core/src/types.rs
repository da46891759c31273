//! Shared types used across the harvest pipeline.
//!
//! This module defines the request model, the validated run configuration
//! and the per-site result records that flow from the orchestrator to the
//! event stream and the run registry.

use crate::config::ScrapingConfig;
use crate::error::HarvestError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

/// A single trimmed, non-blank search query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query(String);

impl Query {
    /// Create a new `Query`, trimming surrounding whitespace.
    ///
    /// # Errors
    /// Returns error if the query is blank after trimming.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, HarvestError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(HarvestError::Validation(
                "search query must not be blank".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Split a raw query string on `delimiter`, trimming each part and
/// discarding empty ones. Order is preserved.
#[must_use]
pub fn parse_queries(raw: &str, delimiter: &str) -> Vec<Query> {
    raw.split(delimiter)
        .filter_map(|part| Query::new(part).ok())
        .collect()
}

/// Identifier for one scrape request.
///
/// Run IDs are UUID v4 strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    /// Create a new random `RunId`.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// One organic result entry scraped from a search results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultLink {
    /// Absolute URL of the result
    pub url: String,
    /// Heading text shown for the result
    pub text: String,
}

/// Insertion-ordered set of contact strings.
///
/// Matching is exact and case-sensitive; values are stored as captured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactSet(Vec<String>);

impl ContactSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value unless it is already present. Returns `true` if inserted.
    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if self.0.contains(&value) {
            return false;
        }
        self.0.push(value);
        true
    }

    /// Whether the set holds `value`.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|v| v == value)
    }

    /// Number of distinct values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Order-independent membership comparison.
    #[must_use]
    pub fn same_members(&self, other: &Self) -> bool {
        let left: HashSet<&str> = self.iter().collect();
        let right: HashSet<&str> = other.iter().collect();
        left == right
    }
}

impl<S: Into<String>> FromIterator<S> for ContactSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<S: Into<String>> Extend<S> for ContactSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

/// Contacts found on one visited site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteExtractionResult {
    /// Query whose results led to this site
    pub query: String,
    /// 1-based position within the query's visited list
    pub rank: usize,
    /// Visited URL
    pub url: String,
    /// Result heading text from the search page
    pub text: String,
    /// Email addresses found
    pub emails: ContactSet,
    /// Phone numbers found
    pub phone_numbers: ContactSet,
}

/// Inbound scrape request, as submitted by a caller.
///
/// Numeric fields are optional; missing ones take the `[scraping]` defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    /// Delimiter-separated queries
    #[serde(default)]
    pub query: String,
    /// Maximum sites to visit per query
    pub limit: Option<usize>,
    /// Lower bound of the randomized delay, in seconds
    pub min_delay: Option<f64>,
    /// Upper bound of the randomized delay, in seconds
    pub max_delay: Option<f64>,
    /// Per-attempt navigation timeout, in milliseconds
    pub timeout: Option<u64>,
    /// Attempts per site
    pub retries: Option<u32>,
}

impl RunRequest {
    /// Create a request for `query` with every other field defaulted.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Validate the request and fill defaults from `defaults`.
    ///
    /// # Errors
    /// Returns `HarvestError::Validation` when the query has no usable
    /// segment or a numeric field is out of range.
    pub fn resolve(&self, defaults: &ScrapingConfig) -> Result<RunConfiguration, HarvestError> {
        if self.query.trim().is_empty() {
            return Err(HarvestError::Validation(
                "Search query is required".to_string(),
            ));
        }

        let queries = parse_queries(&self.query, &defaults.query_delimiter);
        if queries.is_empty() {
            return Err(HarvestError::Validation(
                "At least one valid search query is required".to_string(),
            ));
        }

        let config = RunConfiguration {
            queries,
            limit: self.limit.unwrap_or(defaults.default_limit),
            min_delay_secs: self.min_delay.unwrap_or(defaults.default_min_delay_secs),
            max_delay_secs: self.max_delay.unwrap_or(defaults.default_max_delay_secs),
            timeout_ms: self.timeout.unwrap_or(defaults.default_timeout_ms),
            retries: self.retries.unwrap_or(defaults.default_retries),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Validated, immutable configuration for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfiguration {
    /// Queries in submission order
    pub queries: Vec<Query>,
    /// Maximum sites to visit per query
    pub limit: usize,
    /// Lower delay bound in seconds
    pub min_delay_secs: f64,
    /// Upper delay bound in seconds
    pub max_delay_secs: f64,
    /// Per-attempt timeout in milliseconds
    pub timeout_ms: u64,
    /// Attempts per site
    pub retries: u32,
}

impl RunConfiguration {
    /// Check range constraints on every field.
    ///
    /// # Errors
    /// Returns `HarvestError::Validation` describing the first violation.
    pub fn validate(&self) -> Result<(), HarvestError> {
        if self.queries.is_empty() {
            return Err(HarvestError::Validation(
                "At least one valid search query is required".to_string(),
            ));
        }
        if self.limit == 0 {
            return Err(HarvestError::Validation(
                "limit must be greater than zero".to_string(),
            ));
        }
        for (name, value) in [
            ("minDelay", self.min_delay_secs),
            ("maxDelay", self.max_delay_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(HarvestError::Validation(format!(
                    "{name} must be a non-negative number of seconds, got {value}"
                )));
            }
        }
        if self.min_delay_secs > self.max_delay_secs {
            return Err(HarvestError::Validation(format!(
                "minDelay ({}) must not exceed maxDelay ({})",
                self.min_delay_secs, self.max_delay_secs
            )));
        }
        if self.timeout_ms == 0 {
            return Err(HarvestError::Validation(
                "timeout must be greater than zero".to_string(),
            ));
        }
        if self.retries == 0 {
            return Err(HarvestError::Validation(
                "retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-attempt timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Maximum number of result pages to fetch per query.
    #[must_use]
    pub fn pages_to_scrape(&self, results_per_page: usize) -> usize {
        self.limit.div_ceil(results_per_page.max(1))
    }
}

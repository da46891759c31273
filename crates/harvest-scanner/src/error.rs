use harvest_browser::BrowserError;
use harvest_core::HarvestError;
use thiserror::Error;

/// Errors raised while validating or running a scrape.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The request failed validation before any browser work
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A configured CSS selector could not be parsed
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector {
        /// Selector text as configured
        selector: String,
        /// Parser message
        reason: String,
    },

    /// Browser session failure
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// The run task panicked
    #[error("run panicked: {0}")]
    Panicked(String),

    /// The dispatcher admitting queued runs is gone
    #[error("run dispatcher stopped")]
    DispatcherStopped,

    /// Core failure unrelated to the request's contents
    #[error(transparent)]
    Core(HarvestError),
}

impl From<HarvestError> for ScanError {
    fn from(err: HarvestError) -> Self {
        match err {
            HarvestError::Validation(msg) => Self::InvalidRequest(msg),
            other => Self::Core(other),
        }
    }
}

/// Result alias for scanner operations.
pub type Result<T> = std::result::Result<T, ScanError>;

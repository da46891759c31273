//! Error body written for rejected requests.

use harvest_scanner::ScanError;
use serde::Serialize;

/// Serializable error for the command-line front end.
#[derive(Debug, Serialize)]
pub struct CommandError {
    /// Error code for callers to branch on (e.g., "INVALID_REQUEST")
    pub code: String,
    /// User-facing error message
    pub error: String,
    /// Optional debugging context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl CommandError {
    /// Create a new command error.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            error: error.into(),
            details: None,
        }
    }

    /// Create a command error with details.
    pub fn with_details(
        code: impl Into<String>,
        error: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            code: code.into(),
            error: error.into(),
            details: Some(details),
        }
    }
}

impl From<ScanError> for CommandError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::InvalidRequest(msg) => Self::new("INVALID_REQUEST", msg),
            ScanError::InvalidSelector { selector, reason } => Self::with_details(
                "INVALID_SELECTOR",
                format!("Invalid search selector '{selector}'"),
                serde_json::json!({ "reason": reason }),
            ),
            ScanError::Browser(e) => Self::new("BROWSER_ERROR", e.to_string()),
            ScanError::Panicked(msg) => Self::new("INTERNAL_ERROR", msg),
            ScanError::DispatcherStopped => {
                Self::new("UNAVAILABLE", "The scraper is no longer accepting runs")
            }
            ScanError::Core(e) => Self::new("INTERNAL_ERROR", e.to_string()),
        }
    }
}

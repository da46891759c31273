use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("navigation failed: {0}")]
    NavigationError(String),

    #[error("selector not found: {0}")]
    SelectorNotFound(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("page evaluation failed: {0}")]
    EvaluationError(String),

    #[error("browser session is closed")]
    SessionClosed,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

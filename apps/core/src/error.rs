use thiserror::Error;

/// Application-wide error type, consolidating all possible errors into a single enum.
///
/// Only the I/O boundary (completion client, fixture provider, HTTP layer) produces these.
/// The `brain` module is total and never returns an error.
#[derive(Debug, Error, Clone)]
pub enum AppError {
    /// Represents data validation errors (e.g., a missing or blank message).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Represents configuration-related errors (e.g., an unset API key or a malformed URL).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Represents failures of an upstream provider (network error, non-2xx status, bad payload).
    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    /// Represents errors from operations that did not complete in time.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Represents failures of the actor system, such as a closed channel.
    #[error("Actor error: {0}")]
    Actor(String),

    /// Represents unexpected internal errors that indicate a bug.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the error comes from an upstream dependency and should be replaced by a
    /// fallback reply instead of failing the request.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AppError::Upstream(_) | AppError::Timeout(_) | AppError::Config(_)
        )
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        AppError::Timeout(format!("Operation timed out: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("JSON error: {}", err))
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Config(format!("URL parse error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(format!("Validation errors: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(format!("HTTP timeout: {}", err))
        } else {
            AppError::Upstream(format!("HTTP error: {}", err))
        }
    }
}

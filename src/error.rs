//! Error types for the portfolio dashboard
//!
//! Uses thiserror for ergonomic error definitions.
//! Every failure is caught at the page level and turned into a notice,
//! so nothing here is meant to reach the user as a panic.

use thiserror::Error;

/// Custom Result type using our Error
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Dashboard errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    /// Non-2xx answer or transport failure. `status` is `None` when the
    /// request never got an HTTP answer.
    #[error("Network error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Network {
        status: Option<u16>,
        message: String,
    },

    /// Body could not be decoded into the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// No wallet provider is installed
    #[error("Wallet provider not available")]
    WalletUnavailable,

    /// The provider or the user refused the account request
    #[error("Wallet request rejected: {0}")]
    WalletRejected(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Settings storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Form validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// JSON encoding errors outside of response decoding
    #[error("JSON error: {0}")]
    Json(String),

    /// Chart widget script errors
    #[error("Chart error: {0}")]
    Chart(String),
}

impl TrackerError {
    /// Build a network error from an HTTP status and body text
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        TrackerError::Network {
            status: Some(status),
            message: message.into(),
        }
    }

    /// HTTP status attached to the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            TrackerError::Network { status, .. } => *status,
            _ => None,
        }
    }

    /// Friendly notice text for a failed load of `what`
    pub fn user_message(what: &str) -> String {
        format!("Failed to load {what}.")
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Json(err.to_string())
    }
}

impl From<reqwest::Error> for TrackerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return TrackerError::MalformedResponse(err.to_string());
        }
        TrackerError::Network {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        TrackerError::Storage(err.to_string())
    }
}

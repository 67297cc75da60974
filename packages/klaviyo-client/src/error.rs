//! Error types for the Klaviyo client.

use thiserror::Error;

/// Result type for Klaviyo client operations.
pub type Result<T> = std::result::Result<T, KlaviyoError>;

/// Klaviyo client errors.
#[derive(Debug, Error)]
pub enum KlaviyoError {
    /// Transport failure (connection refused, TLS, timeout inside reqwest)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response from the API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

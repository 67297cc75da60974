//! Error types for the Medusa client.

use thiserror::Error;

/// Result type for Medusa client operations.
pub type Result<T> = std::result::Result<T, MedusaError>;

/// Medusa client errors. A 404 is not an error: lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum MedusaError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

//! Error types for upstream sources

use thiserror::Error;

/// Errors raised while talking to the council site or API
#[derive(Error, Debug)]
pub enum SourceError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("{url} returned status {status}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Upstream body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// PDF text extraction failed
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Client could not be configured
    #[error("Configuration error: {0}")]
    Config(String),
}

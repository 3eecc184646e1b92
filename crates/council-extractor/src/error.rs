//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur during decision extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Minutes text was empty or whitespace
    #[error("Please provide valid meeting minutes text")]
    EmptyInput,

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Text exceeds maximum length
    #[error("Text too long: {0} chars (max: {1})")]
    TextTooLong(usize, usize),

    /// Extraction timeout
    #[error("Extraction timeout after {0}s")]
    Timeout(u64),

    /// LLM response did not have the expected shape
    #[error("Invalid decision format: {0}")]
    InvalidFormat(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}

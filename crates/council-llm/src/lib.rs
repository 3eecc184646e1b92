//! Council LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `council-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `GeminiProvider`: Google Gemini `generateContent` API with structured output
//!
//! # Examples
//!
//! ```
//! use council_llm::MockProvider;
//! use council_domain::traits::LlmProvider;
//!
//! # async fn example() {
//! let provider = MockProvider::new("[]");
//! let result = provider.generate("test prompt").await.unwrap();
//! assert_eq!(result, "[]");
//! # }
//! ```

#![warn(missing_docs)]

pub mod gemini;

use council_domain::traits::LlmProvider;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

pub use gemini::GeminiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The response schema passed by the caller is not valid JSON
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider is missing required configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether another attempt could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, LlmError::Communication(_) | LlmError::RateLimitExceeded)
    }
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Fail,
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// Responses are keyed by a fragment of the prompt: the first registered
/// fragment contained in the prompt decides the reply.
///
/// # Examples
///
/// ```
/// use council_llm::MockProvider;
/// use council_domain::traits::LlmProvider;
///
/// # async fn example() {
/// let mut provider = MockProvider::default();
/// provider.add_response("budget", "[]");
/// provider.add_error("zoning");
///
/// assert_eq!(provider.generate("the budget minutes").await.unwrap(), "[]");
/// assert!(provider.generate("the zoning minutes").await.is_err());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<Vec<(String, MockReply)>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Reply with `response` to prompts containing `fragment`
    pub fn add_response(&mut self, fragment: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((fragment.into(), MockReply::Text(response.into())));
    }

    /// Fail every prompt containing `fragment`
    pub fn add_error(&mut self, fragment: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((fragment.into(), MockReply::Fail));
    }

    /// Get the number of times the provider was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap_or_else(PoisonError::into_inner) = 0;
    }

    fn reply(&self, prompt: &str) -> Result<String, LlmError> {
        *self.call_count.lock().unwrap_or_else(PoisonError::into_inner) += 1;

        let responses = self.responses.lock().unwrap_or_else(PoisonError::into_inner);
        match responses.iter().find(|(fragment, _)| prompt.contains(fragment.as_str())) {
            Some((_, MockReply::Text(text))) => Ok(text.clone()),
            Some((fragment, MockReply::Fail)) => {
                Err(LlmError::Other(format!("Mock error for '{}'", fragment)))
            }
            None => Ok(self.default_response.clone()),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProvider for MockProvider {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.reply(prompt)
    }

    async fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error> {
        serde_json::from_str::<serde_json::Value>(schema)
            .map_err(|e| LlmError::InvalidSchema(e.to_string()))?;
        self.reply(prompt)
    }
}

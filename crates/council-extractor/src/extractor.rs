//! Core DecisionExtractor implementation

use crate::chunking::MinutesChunker;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::parse_llm_response;
use crate::prompt::{PromptBuilder, DECISIONS_SCHEMA};
use council_domain::traits::LlmProvider;
use council_domain::MeetingDecision;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info};

/// Extracts structured decisions from meeting minutes
pub struct DecisionExtractor<L> {
    llm_provider: Arc<L>,
    config: ExtractorConfig,
}

impl<L: LlmProvider> DecisionExtractor<L> {
    /// Create a new DecisionExtractor
    pub fn new(llm_provider: L, config: ExtractorConfig) -> Self {
        Self::from_shared(Arc::new(llm_provider), config)
    }

    /// Create a DecisionExtractor over a provider shared with other callers
    pub fn from_shared(llm_provider: Arc<L>, config: ExtractorConfig) -> Self {
        Self {
            llm_provider,
            config,
        }
    }

    /// The active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract decisions from the text of one meeting's minutes
    ///
    /// Minutes longer than `max_chunk_size` are extracted piece by piece and
    /// the decisions concatenated in document order.
    pub async fn extract_decisions(
        &self,
        minutes: &str,
    ) -> Result<Vec<MeetingDecision>, ExtractorError> {
        let minutes = minutes.trim();
        if minutes.is_empty() {
            return Err(ExtractorError::EmptyInput);
        }

        if minutes.len() > self.config.max_text_length {
            return Err(ExtractorError::TextTooLong(
                minutes.len(),
                self.config.max_text_length,
            ));
        }

        let chunks = MinutesChunker::new(self.config.max_chunk_size).chunk(minutes);
        if chunks.len() > 1 {
            info!("Minutes exceed max chunk size, split into {} pieces", chunks.len());
        }

        let mut decisions = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            debug!("Extracting piece {}/{}", idx + 1, chunks.len());
            let prompt = PromptBuilder::new(chunk.as_str())
                .with_part(idx, chunks.len())
                .build();
            decisions.extend(self.extract_chunk(&prompt).await?);
        }

        Ok(decisions)
    }

    async fn extract_chunk(&self, prompt: &str) -> Result<Vec<MeetingDecision>, ExtractorError> {
        debug!("Prompt length: {} chars", prompt.len());

        let llm_response = timeout(
            self.config.extraction_timeout(),
            self.llm_provider.generate_structured(prompt, DECISIONS_SCHEMA),
        )
        .await
        .map_err(|_| ExtractorError::Timeout(self.config.extraction_timeout_secs))?
        .map_err(|e| ExtractorError::Llm(e.to_string()))?;

        debug!("LLM response length: {} chars", llm_response.len());

        parse_llm_response(&llm_response)
    }
}

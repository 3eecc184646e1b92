//! Council Extractor
//!
//! Turns the plain text of council meeting minutes into structured
//! decisions using an LLM.
//!
//! # Architecture
//!
//! ```text
//! Minutes text → chunking → prompt → LLM (JSON schema) → parser → Vec<MeetingDecision>
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use council_extractor::{DecisionExtractor, ExtractorConfig};
//! use council_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new("[]");
//! let extractor = DecisionExtractor::new(llm, ExtractorConfig::default());
//!
//! let decisions = extractor
//!     .extract_decisions("THAT Council approve the 2026 operating budget.")
//!     .await?;
//! println!("Extracted {} decisions", decisions.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod chunking;
mod config;
mod error;
mod extractor;
mod parser;
mod prompt;


pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::DecisionExtractor;
pub use parser::parse_llm_response;
pub use prompt::{PromptBuilder, DECISIONS_SCHEMA};

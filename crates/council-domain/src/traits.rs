//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the streaming pipeline and the
//! services it calls. Infrastructure implementations live in other crates.

use crate::{DateRange, MeetingRecord};
use std::fmt::Display;
use std::future::Future;

/// Produces the ordered list of work items for one pipeline run
///
/// Implemented by the infrastructure layer (council-sources). The position
/// of an item in the returned list is its identity for the rest of the run.
pub trait ItemFetcher: Send + Sync {
    /// The work item type
    type Item: Clone + Send + Sync;

    /// Error type for fetch operations
    type Error: Display + Send;

    /// Fetch the items that fall within `range`, in the order they must be emitted
    fn fetch_ordered(
        &self,
        range: &DateRange,
    ) -> impl Future<Output = Result<Vec<Self::Item>, Self::Error>> + Send;
}

/// Turns one work item into an enriched result
///
/// Implemented by the application layer (council-server). Latency is
/// expected to vary widely between items.
pub trait ItemProcessor<I>: Send + Sync {
    /// The enriched result type
    type Output: Send;

    /// Error type for processing a single item
    type Error: Display + Send;

    /// Process one item
    fn process(&self, item: &I) -> impl Future<Output = Result<Self::Output, Self::Error>> + Send;
}

/// Source of a meeting's minutes as plain text
///
/// Implemented by the infrastructure layer (council-sources). Failures are
/// soft: a meeting with no retrievable minutes yields `None`.
pub trait MinutesSource: Send + Sync {
    /// Retrieve the minutes text for a meeting
    fn minutes_text(&self, meeting: &MeetingRecord) -> impl Future<Output = Option<String>> + Send;
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (council-llm)
pub trait LlmProvider: Send + Sync {
    /// Error type for LLM operations
    type Error: Display + Send;

    /// Generate text completion
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Generate JSON constrained by a JSON schema
    fn generate_structured(
        &self,
        prompt: &str,
        schema: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

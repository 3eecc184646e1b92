//! Outcomes and the events that carry them to a sink

use serde::Serialize;

/// The result of processing one work item
///
/// Serializes as whichever value it holds, so a degraded item reaches the
/// consumer as a plain pass-through of the original.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProcessingOutcome<I, O> {
    /// The processor succeeded
    Enriched(O),
    /// The processor failed; the original item stands in for the result
    Degraded(I),
}

impl<I, O> ProcessingOutcome<I, O> {
    /// Whether processing failed for this item
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    /// The enriched result, if processing succeeded
    pub fn enriched(&self) -> Option<&O> {
        match self {
            Self::Enriched(output) => Some(output),
            Self::Degraded(_) => None,
        }
    }
}

/// One event on a pipeline's output stream
///
/// A run emits zero or more `Item`s in ascending index order followed by
/// exactly one `Complete` or `Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent<T> {
    /// An in-order result
    Item {
        /// Position of the item in the fetched list
        index: usize,
        /// The result
        payload: T,
    },
    /// Every fetched item was emitted
    Complete {
        /// Number of items fetched
        count: usize,
    },
    /// The run was aborted
    Error {
        /// What went wrong
        message: String,
    },
}

impl<T> StreamEvent<T> {
    /// Short name of the event kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Item { .. } => "item",
            Self::Complete { .. } => "complete",
            Self::Error { .. } => "error",
        }
    }

    /// Whether this event ends the stream
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Item { .. })
    }
}

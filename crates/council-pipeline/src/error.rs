//! Error types for pipeline runs

use thiserror::Error;

/// Errors that can end a pipeline run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// The item fetcher failed before any item was processed
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Invalid pipeline configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The claim/emit bookkeeping broke
    #[error("Invariant violation: {0}")]
    Invariant(#[from] ReorderError),
}

/// Reorder buffer bookkeeping failures
///
/// None of these can happen while every index is claimed exactly once.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReorderError {
    /// An outcome for this index is already pending
    #[error("duplicate outcome for index {0}")]
    Duplicate(usize),

    /// The index was already emitted
    #[error("index {index} arrived after the cursor passed it (next to emit: {next})")]
    AlreadyEmitted {
        /// The late index
        index: usize,
        /// The emit cursor at the time
        next: usize,
    },

    /// The pool finished with outcomes still held or indices missing
    #[error("{pending} outcomes still buffered, emitted {emitted} of {expected}")]
    Undrained {
        /// Outcomes left in the buffer
        pending: usize,
        /// Items emitted
        emitted: usize,
        /// Items fetched
        expected: usize,
    },
}

/// Failures writing to an event sink
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The consumer went away
    #[error("Sink closed")]
    Closed,

    /// The transport rejected the event
    #[error("Transport error: {0}")]
    Transport(String),
}

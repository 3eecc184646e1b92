//! Run state and the report a finished run leaves behind

use crate::error::PipelineError;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Where a run is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Waiting on the item fetcher
    Fetching,
    /// Workers are claiming and processing items
    Processing,
    /// Workers are done; checking everything was emitted
    Draining,
    /// `complete` was sent
    Completed,
    /// `error` was sent
    Failed,
}

impl PipelineState {
    /// Whether the run is over
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetching => "fetching",
            Self::Processing => "processing",
            Self::Draining => "draining",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Summary of one pipeline run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Identifier recorded on the run's tracing span
    pub run_id: Uuid,

    /// Final state
    pub state: PipelineState,

    /// Workers started
    pub worker_count: usize,

    /// Items the fetcher returned
    pub fetched: usize,

    /// Items released from the reorder buffer, delivered or not
    pub emitted: usize,

    /// Items emitted unenriched
    pub degraded: usize,

    /// Items processed by each worker
    pub per_worker: Vec<usize>,

    /// Whether the sink stopped accepting events mid-run
    pub sink_disconnected: bool,

    /// Why the run failed
    pub error: Option<PipelineError>,

    /// Wall time from start to terminal event
    pub elapsed: Duration,
}

impl RunReport {
    pub(crate) fn new(run_id: Uuid, worker_count: usize) -> Self {
        Self {
            run_id,
            state: PipelineState::Fetching,
            worker_count,
            fetched: 0,
            emitted: 0,
            degraded: 0,
            per_worker: Vec::new(),
            sink_disconnected: false,
            error: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Whether the run ended with `complete`
    pub fn is_success(&self) -> bool {
        self.state == PipelineState::Completed
    }

    /// Items emitted with their enrichment
    pub fn enriched(&self) -> usize {
        self.emitted.saturating_sub(self.degraded)
    }

    /// One-line description for logs
    pub fn summary(&self) -> String {
        match &self.error {
            Some(e) => format!("run {} {} after {:?}: {}", self.run_id, self.state, self.elapsed, e),
            None => format!(
                "run {} {} in {:?}: {}/{} emitted ({} enriched, {} degraded) by {} workers{}",
                self.run_id,
                self.state,
                self.elapsed,
                self.emitted,
                self.fetched,
                self.enriched(),
                self.degraded,
                self.worker_count,
                if self.sink_disconnected {
                    ", consumer disconnected"
                } else {
                    ""
                }
            ),
        }
    }
}

//! Pipeline orchestration: fetch, process, drain, terminate

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::event::ProcessingOutcome;
use crate::pool::run_pool;
use crate::report::{PipelineState, RunReport};
use crate::sink::{EventSink, SinkGuard};
use council_domain::traits::{ItemFetcher, ItemProcessor};
use council_domain::DateRange;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Outcome type produced by a pipeline over fetcher `F` and processor `P`
pub type OutcomeOf<F, P> = ProcessingOutcome<
    <F as ItemFetcher>::Item,
    <P as ItemProcessor<<F as ItemFetcher>::Item>>::Output,
>;

/// Ordered concurrent streaming pipeline
///
/// Each call to [`run`](Self::run) fetches a fresh item list, processes it
/// with a fixed-size worker pool and streams results to a sink in list
/// order. Nothing is shared between runs.
pub struct Pipeline<F, P> {
    fetcher: Arc<F>,
    processor: Arc<P>,
    config: PipelineConfig,
}

impl<F, P> Pipeline<F, P>
where
    F: ItemFetcher,
    P: ItemProcessor<F::Item>,
{
    /// Create a pipeline
    pub fn new(fetcher: F, processor: P, config: PipelineConfig) -> Result<Self, PipelineError> {
        Self::from_shared(Arc::new(fetcher), Arc::new(processor), config)
    }

    /// Create a pipeline over collaborators shared with other callers
    pub fn from_shared(
        fetcher: Arc<F>,
        processor: Arc<P>,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            fetcher,
            processor,
            config,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The item fetcher
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Run once with the configured worker count
    pub async fn run<S>(&self, range: &DateRange, sink: &S) -> RunReport
    where
        S: EventSink<OutcomeOf<F, P>> + ?Sized,
    {
        self.run_with_workers(range, self.config.worker_count, sink)
            .await
    }

    /// Run once with an explicit worker count
    ///
    /// Drives the sink to exactly one terminal event and closes it, whatever
    /// happens. The returned report is for logging and tests; the sink has
    /// already seen everything the consumer needs.
    pub async fn run_with_workers<S>(&self, range: &DateRange, workers: usize, sink: &S) -> RunReport
    where
        S: EventSink<OutcomeOf<F, P>> + ?Sized,
    {
        let workers = if workers == 0 {
            warn!("Worker count 0 requested, using 1");
            1
        } else {
            workers
        };

        let run_id = Uuid::now_v7();
        let span = info_span!("pipeline_run", %run_id, workers);
        async move {
            let report = self.execute(run_id, range, workers, sink).await;
            info!("{}", report.summary());
            report
        }
        .instrument(span)
        .await
    }

    async fn execute<S>(&self, run_id: Uuid, range: &DateRange, workers: usize, sink: &S) -> RunReport
    where
        S: EventSink<OutcomeOf<F, P>> + ?Sized,
    {
        let started = Instant::now();
        let mut report = RunReport::new(run_id, workers);
        let guard = SinkGuard::new(sink);

        info!("Fetching items ({})", range);
        let items = match self.fetcher.fetch_ordered(range).await {
            Ok(items) => items,
            Err(e) => {
                let message = e.to_string();
                error!("Item fetch failed: {}", message);
                if let Err(sink_err) = guard.fail(message.clone()) {
                    debug!("Error event not delivered: {}", sink_err);
                }
                report.state = PipelineState::Failed;
                report.error = Some(PipelineError::Fetch(message));
                report.elapsed = started.elapsed();
                return report;
            }
        };

        report.fetched = items.len();
        report.state = PipelineState::Processing;
        info!("Processing {} items with {} workers", items.len(), workers);

        let summary = run_pool(&items, workers, self.processor.as_ref(), sink).await;

        report.state = PipelineState::Draining;
        report.emitted = summary.emitted;
        report.degraded = summary.degraded;
        report.per_worker = summary.per_worker;
        report.sink_disconnected = summary.disconnected;

        let delivered = match summary.violation {
            None => {
                report.state = PipelineState::Completed;
                guard.complete(items.len())
            }
            Some(violation) => {
                let err = PipelineError::Invariant(violation);
                error!("Aborting run: {}", err);
                report.state = PipelineState::Failed;
                let delivered = guard.fail(err.to_string());
                report.error = Some(err);
                delivered
            }
        };
        if let Err(e) = delivered {
            debug!("Terminal event not delivered: {}", e);
        }

        report.elapsed = started.elapsed();
        report
    }
}

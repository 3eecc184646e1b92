//! Council Pipeline
//!
//! Ordered concurrent streaming: process a list of items with a bounded
//! worker pool, out of order, and stream the results to a sink in list order.
//!
//! # Overview
//!
//! A run moves through `Fetching → Processing → Draining → Completed | Failed`:
//!
//! - **Fetching**: the [`ItemFetcher`](council_domain::traits::ItemFetcher)
//!   returns the ordered list. On failure a single `error` event is sent.
//! - **Processing**: `worker_count` workers claim indices from a shared
//!   cursor and run the [`ItemProcessor`](council_domain::traits::ItemProcessor).
//!   A failed or panicking item becomes [`ProcessingOutcome::Degraded`]; it is
//!   never a stream error.
//! - **Draining**: each outcome goes into the [`ReorderBuffer`]; the run of
//!   consecutive indices at its cursor is emitted immediately. When the pool
//!   is done the buffer must be empty.
//! - **Completed**: `complete { count }` is sent and the sink closed.
//!
//! # Usage
//!
//! ```no_run
//! use council_pipeline::{ChannelSink, Pipeline, PipelineConfig};
//! # use council_domain::DateRange;
//! # async fn example<F, P>(fetcher: F, processor: P) -> Result<(), Box<dyn std::error::Error>>
//! # where
//! #     F: council_domain::traits::ItemFetcher,
//! #     P: council_domain::traits::ItemProcessor<F::Item>,
//! # {
//! let pipeline = Pipeline::new(fetcher, processor, PipelineConfig::default())?;
//! let (sink, mut events) = ChannelSink::channel();
//!
//! let report = pipeline.run(&DateRange::unbounded(), &sink).await;
//! while let Some(event) = events.recv().await {
//!     println!("{}", event.kind());
//! }
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod event;
mod pipeline;
mod pool;
mod reorder;
mod report;
mod sink;

pub use config::{PipelineConfig, DEFAULT_WORKER_COUNT};
pub use error::{PipelineError, ReorderError, SinkError};
pub use event::{ProcessingOutcome, StreamEvent};
pub use pipeline::{OutcomeOf, Pipeline};
pub use reorder::ReorderBuffer;
pub use report::{PipelineState, RunReport};
pub use sink::{ChannelSink, EventSink, SinkGuard};

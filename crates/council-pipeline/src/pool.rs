//! Worker pool: claim an index, process it, hand the outcome to the reorder buffer

use crate::error::ReorderError;
use crate::event::{ProcessingOutcome, StreamEvent};
use crate::reorder::ReorderBuffer;
use crate::sink::EventSink;
use council_domain::traits::ItemProcessor;
use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, warn};

/// Hands out each index below `len` exactly once
struct ClaimCursor {
    next: AtomicUsize,
    len: usize,
}

impl ClaimCursor {
    fn new(len: usize) -> Self {
        Self {
            next: AtomicUsize::new(0),
            len,
        }
    }

    fn claim(&self) -> Option<usize> {
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        (index < self.len).then_some(index)
    }
}

/// Ordering state shared by all workers of one run
///
/// Insert, drain and emit happen under one lock with no await in between.
struct Emission<'s, I, O, S: ?Sized> {
    buffer: ReorderBuffer<ProcessingOutcome<I, O>>,
    sink: &'s S,
    emitted: usize,
    degraded: usize,
    disconnected: bool,
    violation: Option<ReorderError>,
}

impl<'s, I, O, S> Emission<'s, I, O, S>
where
    S: EventSink<ProcessingOutcome<I, O>> + ?Sized,
{
    fn new(sink: &'s S) -> Self {
        Self {
            buffer: ReorderBuffer::new(),
            sink,
            emitted: 0,
            degraded: 0,
            disconnected: false,
            violation: None,
        }
    }

    fn accept(&mut self, index: usize, outcome: ProcessingOutcome<I, O>) {
        if outcome.is_degraded() {
            self.degraded += 1;
        }

        if let Err(e) = self.buffer.insert(index, outcome) {
            error!("Reorder buffer rejected index {}: {}", index, e);
            if cfg!(debug_assertions) {
                panic!("reorder buffer rejected index {}: {}", index, e);
            }
            self.violation.get_or_insert(e);
            return;
        }

        let Self {
            buffer,
            sink,
            emitted,
            disconnected,
            ..
        } = self;
        buffer.drain_ready(|index, payload| {
            *emitted += 1;
            if *disconnected {
                return;
            }
            if let Err(e) = sink.emit(StreamEvent::Item { index, payload }) {
                warn!("Sink rejected item {}, discarding further output: {}", index, e);
                *disconnected = true;
            }
        });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What the pool did
#[derive(Debug, Default)]
pub(crate) struct PoolSummary {
    pub emitted: usize,
    pub degraded: usize,
    pub disconnected: bool,
    pub per_worker: Vec<usize>,
    pub violation: Option<ReorderError>,
}

/// Process every item with `workers` concurrent workers, emitting in index order
///
/// All workers run as futures on the calling task, so there is no
/// parallelism, only interleaving at the processor's await points.
pub(crate) async fn run_pool<I, P, S>(
    items: &[I],
    workers: usize,
    processor: &P,
    sink: &S,
) -> PoolSummary
where
    I: Clone + Send + Sync,
    P: ItemProcessor<I>,
    S: EventSink<ProcessingOutcome<I, P::Output>> + ?Sized,
{
    let cursor = ClaimCursor::new(items.len());
    let state = Mutex::new(Emission::new(sink));

    let pool: Vec<_> = (0..workers)
        .map(|worker_id| worker(worker_id, items, &cursor, processor, &state))
        .collect();
    let per_worker = join_all(pool).await;

    let emission = state.into_inner().unwrap_or_else(PoisonError::into_inner);
    let violation = emission.violation.or_else(|| {
        (!emission.buffer.is_empty() || emission.emitted != items.len()).then(|| {
            ReorderError::Undrained {
                pending: emission.buffer.pending(),
                emitted: emission.emitted,
                expected: items.len(),
            }
        })
    });

    PoolSummary {
        emitted: emission.emitted,
        degraded: emission.degraded,
        disconnected: emission.disconnected,
        per_worker,
        violation,
    }
}

async fn worker<I, P, S>(
    worker_id: usize,
    items: &[I],
    cursor: &ClaimCursor,
    processor: &P,
    state: &Mutex<Emission<'_, I, P::Output, S>>,
) -> usize
where
    I: Clone + Send + Sync,
    P: ItemProcessor<I>,
    S: EventSink<ProcessingOutcome<I, P::Output>> + ?Sized,
{
    let mut processed = 0;

    while let Some(index) = cursor.claim() {
        let aborted = lock(state).violation.is_some();
        if aborted {
            break;
        }

        debug!("Worker {} claimed item {}", worker_id, index);
        let outcome = process_isolated(processor, index, &items[index]).await;
        processed += 1;

        lock(state).accept(index, outcome);
    }

    debug!("Worker {} done after {} items", worker_id, processed);
    processed
}

/// Run the processor on one item; failures and panics degrade to the original
async fn process_isolated<I, P>(
    processor: &P,
    index: usize,
    item: &I,
) -> ProcessingOutcome<I, P::Output>
where
    I: Clone,
    P: ItemProcessor<I>,
{
    match AssertUnwindSafe(processor.process(item)).catch_unwind().await {
        Ok(Ok(output)) => ProcessingOutcome::Enriched(output),
        Ok(Err(e)) => {
            warn!("Item {} failed, emitting it unenriched: {}", index, e);
            ProcessingOutcome::Degraded(item.clone())
        }
        Err(panic) => {
            warn!(
                "Item {} panicked, emitting it unenriched: {}",
                index,
                panic_message(panic.as_ref())
            );
            ProcessingOutcome::Degraded(item.clone())
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

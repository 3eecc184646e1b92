//! Event sinks and the guard that finishes them
//!
//! A sink is where a run's [`StreamEvent`]s go. Emission is synchronous and
//! non-blocking; the pipeline calls it while holding its ordering lock, so an
//! implementation must never wait on the consumer.

use crate::error::SinkError;
use crate::event::StreamEvent;
use std::marker::PhantomData;
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::debug;

/// Push-based destination for a run's events
pub trait EventSink<T>: Send + Sync {
    /// Deliver one event
    ///
    /// An error means the event went nowhere. It must not panic.
    fn emit(&self, event: StreamEvent<T>) -> Result<(), SinkError>;

    /// Release the sink; later calls and later emits are harmless
    fn close(&self);
}

/// Sink backed by an unbounded tokio channel
///
/// Closing drops the sender, which ends the receiver's stream once it has
/// drained. A dropped receiver shows up as [`SinkError::Closed`].
pub struct ChannelSink<T> {
    tx: Mutex<Option<mpsc::UnboundedSender<StreamEvent<T>>>>,
}

impl<T> ChannelSink<T> {
    /// Create a sink and the receiving half of its channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StreamEvent<T>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl<T: Send> EventSink<T> for ChannelSink<T> {
    fn emit(&self, event: StreamEvent<T>) -> Result<(), SinkError> {
        let tx = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        match tx.as_ref() {
            Some(tx) => tx.send(event).map_err(|_| SinkError::Closed),
            None => Err(SinkError::Closed),
        }
    }

    fn close(&self) {
        self.tx.lock().unwrap_or_else(PoisonError::into_inner).take();
    }
}

/// Ends a sink exactly once
///
/// `complete` and `fail` send the terminal event and close the sink. If the
/// guard is dropped without either (early return, panic, the run future
/// being dropped) it sends an `error` event and closes.
pub struct SinkGuard<'a, T, S: EventSink<T> + ?Sized> {
    sink: &'a S,
    finished: bool,
    _event: PhantomData<fn(T)>,
}

impl<'a, T, S: EventSink<T> + ?Sized> SinkGuard<'a, T, S> {
    /// Take responsibility for finishing `sink`
    pub fn new(sink: &'a S) -> Self {
        Self {
            sink,
            finished: false,
            _event: PhantomData,
        }
    }

    /// Send `complete` and close
    pub fn complete(mut self, count: usize) -> Result<(), SinkError> {
        self.finish(StreamEvent::Complete { count })
    }

    /// Send `error` and close
    pub fn fail(mut self, message: impl Into<String>) -> Result<(), SinkError> {
        self.finish(StreamEvent::Error {
            message: message.into(),
        })
    }

    fn finish(&mut self, event: StreamEvent<T>) -> Result<(), SinkError> {
        self.finished = true;
        let result = self.sink.emit(event);
        self.sink.close();
        result
    }
}

impl<T, S: EventSink<T> + ?Sized> Drop for SinkGuard<'_, T, S> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        debug!("Sink released without a terminal event");
        if let Err(e) = self.finish(StreamEvent::Error {
            message: "Pipeline aborted".to_string(),
        }) {
            debug!("Abort event not delivered: {}", e);
        }
    }
}

//! Pipeline events as server-sent events
//!
//! `item` goes out as `meeting` with the outcome as data, `complete` as
//! `{"count": n}` and `error` as `{"message": "..."}`.

use axum::response::sse::Event;
use council_pipeline::StreamEvent;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

/// SSE event name and JSON data for a pipeline event
pub fn event_frame<T: Serialize>(
    event: &StreamEvent<T>,
) -> Result<(&'static str, Value), serde_json::Error> {
    Ok(match event {
        StreamEvent::Item { payload, .. } => ("meeting", serde_json::to_value(payload)?),
        StreamEvent::Complete { count } => ("complete", json!({ "count": count })),
        StreamEvent::Error { message } => ("error", json!({ "message": message })),
    })
}

/// Render a pipeline event as an SSE event
pub fn to_sse_event<T: Serialize>(event: StreamEvent<T>) -> Event {
    match event_frame(&event) {
        Ok((name, data)) => Event::default().event(name).data(data.to_string()),
        Err(e) => {
            warn!("Dropping {} event that failed to serialize: {}", event.kind(), e);
            Event::default().comment("unserializable event")
        }
    }
}

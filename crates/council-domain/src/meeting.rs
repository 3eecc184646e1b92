//! Meeting module - council meetings and the decisions extracted from them

use serde::{Deserialize, Serialize};

/// A council meeting as listed by the municipal meetings API
///
/// Serialized in camelCase because the record is passed through to the
/// frontend unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRecord {
    /// Position of the meeting in the upstream listing
    pub id: usize,

    /// Meeting title (e.g., "Regular Council")
    pub meeting_type: String,

    /// Location or scheduling status reported upstream
    pub status: String,

    /// Start timestamp as reported upstream (usually ISO 8601 without zone)
    pub event_date: String,

    /// Absolute URL of the meeting's page on the council site
    pub meeting_url: String,
}

impl MeetingRecord {
    /// Create a meeting record
    pub fn new(
        id: usize,
        meeting_type: impl Into<String>,
        status: impl Into<String>,
        event_date: impl Into<String>,
        meeting_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            meeting_type: meeting_type.into(),
            status: status.into(),
            event_date: event_date.into(),
            meeting_url: meeting_url.into(),
        }
    }

    /// Whether the record points at a page that could hold minutes
    pub fn has_url(&self) -> bool {
        !self.meeting_url.trim().is_empty()
    }
}

/// A decision extracted from a meeting's minutes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingDecision {
    /// Plain-language title
    pub title: String,

    /// The motion text as recorded in the minutes
    pub content: String,

    /// `[latitude, longitude]` when the decision concerns a specific place
    pub location: Option<[f64; 2]>,

    /// One or two sentence summary for a general audience
    pub summary: String,
}

impl MeetingDecision {
    /// Whether a `[lat, lng]` pair lies within valid coordinate ranges
    pub fn is_valid_location(location: [f64; 2]) -> bool {
        let [lat, lng] = location;
        lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng)
    }
}

//! Date range filtering and chronological ordering of meetings

use crate::meeting::MeetingRecord;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::cmp::Reverse;
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive calendar range requested by a client
///
/// Either bound may be absent. An unbounded range matches every meeting,
/// including meetings whose date cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// First day included in the range
    pub start: Option<NaiveDate>,

    /// Last day included in the range
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// A range with no bounds
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Create a range from already-parsed bounds
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Parse a range from optional `YYYY-MM-DD` strings
    ///
    /// Empty strings are treated as absent bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use council_domain::DateRange;
    ///
    /// let range = DateRange::parse(Some("2025-01-01"), None).unwrap();
    /// assert!(range.start.is_some());
    /// assert!(range.end.is_none());
    ///
    /// assert!(DateRange::parse(Some("01/01/2025"), None).is_err());
    /// ```
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, String> {
        Ok(Self {
            start: parse_bound("startDate", start)?,
            end: parse_bound("endDate", end)?,
        })
    }

    /// Whether neither bound is set
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether a calendar day falls inside the range
    pub fn contains(&self, date: NaiveDate) -> bool {
        if let Some(start) = self.start {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date > end {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |d: Option<NaiveDate>| {
            d.map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_else(|| "any".to_string())
        };
        write!(f, "{} to {}", show(self.start), show(self.end))
    }
}

fn parse_bound(name: &str, value: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(Some)
            .map_err(|e| format!("Invalid {} '{}': expected YYYY-MM-DD ({})", name, raw, e)),
    }
}

/// Parse an upstream event timestamp
///
/// Zoned timestamps are normalised to UTC; naive timestamps and bare dates
/// are taken as written.
pub fn parse_event_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(zoned) = DateTime::parse_from_rfc3339(raw) {
        return Some(zoned.naive_utc());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive);
        }
    }

    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Keep the meetings whose calendar date lies within `range`
///
/// With an unbounded range the input is returned as is. Otherwise meetings
/// with a missing or unparseable date are dropped.
pub fn filter_by_date(meetings: Vec<MeetingRecord>, range: &DateRange) -> Vec<MeetingRecord> {
    if range.is_unbounded() {
        return meetings;
    }

    meetings
        .into_iter()
        .filter(|meeting| {
            parse_event_date(&meeting.event_date)
                .map(|dt| range.contains(dt.date()))
                .unwrap_or(false)
        })
        .collect()
}

/// Sort meetings most recent first
///
/// The sort is stable. Meetings without a parseable date go last.
pub fn sort_by_date_desc(meetings: &mut [MeetingRecord]) {
    meetings.sort_by_key(|meeting| {
        let date = parse_event_date(&meeting.event_date);
        (date.is_none(), Reverse(date))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meeting(id: usize, date: &str) -> MeetingRecord {
        MeetingRecord::new(id, "Regular Council", "", date, format!("https://x/{}", id))
    }

    fn ids(meetings: &[MeetingRecord]) -> Vec<usize> {
        meetings.iter().map(|m| m.id).collect()
    }

    #[test]
    fn test_parse_range() {
        let range = DateRange::parse(Some("2025-01-01"), Some("2025-12-31")).unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2025, 12, 31));
        assert!(!range.is_unbounded());
    }

    #[test]
    fn test_parse_empty_bounds_are_absent() {
        let range = DateRange::parse(Some(""), None).unwrap();
        assert!(range.is_unbounded());
    }

    #[test]
    fn test_parse_invalid_bound() {
        let err = DateRange::parse(None, Some("2025-13-01")).unwrap_err();
        assert!(err.contains("endDate"));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let range = DateRange::parse(Some("2025-03-01"), Some("2025-03-31")).unwrap();
        assert!(range.contains(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()));
        assert!(range.contains(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()));
    }

    #[test]
    fn test_display() {
        let range = DateRange::parse(Some("2025-03-01"), None).unwrap();
        assert_eq!(range.to_string(), "2025-03-01 to any");
    }

    #[test]
    fn test_parse_event_date_formats() {
        assert!(parse_event_date("2026-01-15T18:00:00").is_some());
        assert!(parse_event_date("2026-01-15T18:00").is_some());
        assert!(parse_event_date("2026-01-15").is_some());
        assert!(parse_event_date("not a date").is_none());
        assert!(parse_event_date("").is_none());
    }

    #[test]
    fn test_parse_event_date_zoned_is_utc() {
        let dt = parse_event_date("2026-01-15T20:00:00-08:00").unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2026, 1, 16).unwrap());
    }

    #[test]
    fn test_filter_unbounded_keeps_everything() {
        let meetings = vec![meeting(0, "2025-01-01T10:00:00"), meeting(1, "garbage")];
        let filtered = filter_by_date(meetings, &DateRange::unbounded());
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_filter_by_range() {
        let meetings = vec![
            meeting(0, "2025-01-01T10:00:00"),
            meeting(1, "2025-02-10T10:00:00"),
            meeting(2, "2025-03-20T10:00:00"),
            meeting(3, ""),
        ];
        let range = DateRange::parse(Some("2025-02-01"), Some("2025-03-20")).unwrap();

        let filtered = filter_by_date(meetings, &range);
        assert_eq!(ids(&filtered), vec![1, 2]);
    }

    #[test]
    fn test_sort_most_recent_first() {
        let mut meetings = vec![
            meeting(0, "2025-01-01T10:00:00"),
            meeting(1, "bad"),
            meeting(2, "2025-03-20T10:00:00"),
            meeting(3, "2025-02-10T10:00:00"),
        ];
        sort_by_date_desc(&mut meetings);
        assert_eq!(ids(&meetings), vec![2, 3, 0, 1]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_dates() {
        let mut meetings = vec![
            meeting(0, "2025-01-01T10:00:00"),
            meeting(1, "2025-01-01T10:00:00"),
            meeting(2, "2025-01-01T10:00:00"),
        ];
        sort_by_date_desc(&mut meetings);
        assert_eq!(ids(&meetings), vec![0, 1, 2]);
    }
}

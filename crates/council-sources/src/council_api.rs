//! Client for the municipal council meetings API

use crate::error::SourceError;
use council_domain::traits::ItemFetcher;
use council_domain::{filter_by_date, sort_by_date_desc, DateRange, MeetingRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Where the API key is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiKeyLocation {
    /// As a request header named `api_key_name`
    Header,
    /// As a query parameter named `api_key_name`
    Query,
}

/// Configuration for [`CouncilApiClient`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CouncilApiConfig {
    /// API base URL; `/CouncilMeetings` is appended
    pub base_url: String,

    /// API key, if the API requires one
    pub api_key: Option<String>,

    /// Where the key is sent
    pub api_key_location: ApiKeyLocation,

    /// Header or query parameter name for the key
    pub api_key_name: String,

    /// Value of the `type` query parameter (e.g., "previous", "upcoming")
    pub meeting_type: String,

    /// Council website root, used to absolutize relative meeting URLs
    pub site_base_url: String,

    /// Request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for CouncilApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.vancouver.ca/App/CouncilMeetings/CouncilMeetings.API/api"
                .to_string(),
            api_key: None,
            api_key_location: ApiKeyLocation::Header,
            api_key_name: "X-API-Key".to_string(),
            meeting_type: "previous".to_string(),
            site_base_url: "https://council.vancouver.ca".to_string(),
            timeout_secs: 30,
        }
    }
}

impl CouncilApiConfig {
    /// Get the request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// One meeting as returned by the API; every field may be missing
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMeeting {
    event_title: Option<String>,
    location_status: Option<String>,
    event_date_start: Option<String>,
    #[serde(rename = "relatedURL")]
    related_url: Option<String>,
}

/// Lists council meetings
pub struct CouncilApiClient {
    client: reqwest::Client,
    config: CouncilApiConfig,
}

impl CouncilApiClient {
    /// Create a client
    pub fn new(config: CouncilApiConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| SourceError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// The active configuration
    pub fn config(&self) -> &CouncilApiConfig {
        &self.config
    }

    /// Fetch every meeting of the given type, in upstream order
    ///
    /// Each record's `id` is its position in the upstream response.
    pub async fn fetch_all(&self, meeting_type: &str) -> Result<Vec<MeetingRecord>, SourceError> {
        let url = format!("{}/CouncilMeetings", self.config.base_url.trim_end_matches('/'));
        info!("Fetching all {} meetings", meeting_type);

        let mut request = self.client.get(&url).query(&[("type", meeting_type)]);
        if let Some(key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) {
            request = match self.config.api_key_location {
                ApiKeyLocation::Header => request.header(self.config.api_key_name.as_str(), key),
                ApiKeyLocation::Query => request.query(&[(self.config.api_key_name.as_str(), key)]),
            };
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("Meetings response is not JSON: {}", e)))?;

        let meetings: Vec<MeetingRecord> = unwrap_listing(body)
            .into_iter()
            .enumerate()
            .map(|(idx, entry)| self.to_record(idx, entry))
            .collect();

        info!("Fetched {} meetings", meetings.len());
        Ok(meetings)
    }

    fn to_record(&self, id: usize, entry: Value) -> MeetingRecord {
        let raw: RawMeeting = serde_json::from_value(entry).unwrap_or_else(|e| {
            debug!("Meeting {} has unexpected shape: {}", id, e);
            RawMeeting::default()
        });

        MeetingRecord {
            id,
            meeting_type: raw.event_title.unwrap_or_default(),
            status: raw.location_status.unwrap_or_default(),
            event_date: raw.event_date_start.unwrap_or_default(),
            meeting_url: absolutize(&raw.related_url.unwrap_or_default(), &self.config.site_base_url),
        }
    }
}

/// The API returns either a bare array or an object wrapping one
fn unwrap_listing(body: Value) -> Vec<Value> {
    match body {
        Value::Array(entries) => entries,
        Value::Object(mut obj) => ["data", "items", "results", "meetings"]
            .iter()
            .find_map(|key| match obj.remove(*key) {
                Some(Value::Array(entries)) => Some(entries),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn absolutize(url: &str, site_base_url: &str) -> String {
    let url = url.trim();
    if url.is_empty() || url.starts_with("http") {
        url.to_string()
    } else {
        format!("{}{}", site_base_url.trim_end_matches('/'), url)
    }
}

impl ItemFetcher for CouncilApiClient {
    type Item = MeetingRecord;
    type Error = SourceError;

    async fn fetch_ordered(&self, range: &DateRange) -> Result<Vec<MeetingRecord>, SourceError> {
        let all = self.fetch_all(&self.config.meeting_type).await?;
        let mut meetings = filter_by_date(all, range);
        info!("Filtered to {} meetings ({})", meetings.len(), range);
        sort_by_date_desc(&mut meetings);
        Ok(meetings)
    }
}

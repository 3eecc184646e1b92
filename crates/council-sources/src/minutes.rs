//! Meeting minutes retrieval: meeting page → minutes link → PDF → text

use crate::error::SourceError;
use council_domain::traits::MinutesSource;
use council_domain::MeetingRecord;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration for [`MinutesClient`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinutesConfig {
    /// Council website root, used for root-relative minutes links
    pub site_base_url: String,

    /// Text of the anchor that links to the minutes (matched case-insensitively)
    pub link_text: String,

    /// Timeout for fetching the meeting page (seconds)
    pub page_timeout_secs: u64,

    /// Timeout for downloading the PDF (seconds)
    pub pdf_timeout_secs: u64,
}

impl Default for MinutesConfig {
    fn default() -> Self {
        Self {
            site_base_url: "https://council.vancouver.ca".to_string(),
            link_text: "read the minutes".to_string(),
            page_timeout_secs: 30,
            pdf_timeout_secs: 60,
        }
    }
}

/// Retrieves meeting minutes as text
///
/// Successful extractions are cached by meeting URL for the life of the
/// client. Failures are not cached.
pub struct MinutesClient {
    client: reqwest::Client,
    config: MinutesConfig,
    cache: Mutex<HashMap<String, String>>,
}

impl MinutesClient {
    /// Create a client
    pub fn new(config: MinutesConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SourceError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            config,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Drop every cached minutes text
    pub fn clear_cache(&self) {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).clear();
        info!("Minutes text cache cleared");
    }

    /// Number of cached minutes texts
    pub fn cached_len(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn cached(&self, url: &str) -> Option<String> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }

    /// Fetch and extract the minutes text for a meeting
    ///
    /// `Ok(None)` means the meeting has no minutes to read (no link, empty
    /// PDF); `Err` means something went wrong on the way.
    pub async fn fetch_minutes(&self, meeting: &MeetingRecord) -> Result<Option<String>, SourceError> {
        let id = meeting.id;
        let meeting_url = meeting.meeting_url.trim();

        debug!("Meeting {}: fetching page", id);
        let page = self
            .client
            .get(meeting_url)
            .timeout(Duration::from_secs(self.config.page_timeout_secs))
            .send()
            .await?;
        if !page.status().is_success() {
            return Err(SourceError::Status {
                url: meeting_url.to_string(),
                status: page.status().as_u16(),
            });
        }
        let html = page.text().await?;

        let Some(link) = find_minutes_link(&html, &self.config.link_text) else {
            debug!("Meeting {}: no '{}' link found", id, self.config.link_text);
            return Ok(None);
        };
        let pdf_url = resolve_minutes_url(&link, meeting_url, &self.config.site_base_url);

        debug!("Meeting {}: downloading PDF from {}", id, pdf_url);
        let pdf = self
            .client
            .get(&pdf_url)
            .timeout(Duration::from_secs(self.config.pdf_timeout_secs))
            .send()
            .await?;
        if !pdf.status().is_success() {
            return Err(SourceError::Status {
                url: pdf_url,
                status: pdf.status().as_u16(),
            });
        }
        let bytes = pdf.bytes().await?;

        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| SourceError::Pdf(format!("Extraction task failed: {}", e)))?
            .map_err(|e| SourceError::Pdf(e.to_string()))?;

        let text = text.trim();
        if text.is_empty() {
            debug!("Meeting {}: PDF has no text", id);
            return Ok(None);
        }

        info!("Meeting {}: extracted {} characters of minutes", id, text.len());
        Ok(Some(text.to_string()))
    }
}

impl MinutesSource for MinutesClient {
    async fn minutes_text(&self, meeting: &MeetingRecord) -> Option<String> {
        if !meeting.has_url() {
            debug!("Meeting {}: no meeting URL", meeting.id);
            return None;
        }

        if let Some(text) = self.cached(&meeting.meeting_url) {
            debug!("Meeting {}: using cached minutes", meeting.id);
            return Some(text);
        }

        match self.fetch_minutes(meeting).await {
            Ok(Some(text)) => {
                self.cache
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(meeting.meeting_url.clone(), text.clone());
                Some(text)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Meeting {}: minutes unavailable: {}", meeting.id, e);
                None
            }
        }
    }
}

/// Find the href of the first anchor whose text contains `link_text`
pub fn find_minutes_link(html: &str, link_text: &str) -> Option<String> {
    let needle = link_text.trim().to_lowercase();
    let document = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").ok()?;

    document
        .select(&anchors)
        .find(|a| {
            a.text()
                .collect::<String>()
                .trim()
                .to_lowercase()
                .contains(&needle)
        })
        .and_then(|a| a.value().attr("href"))
        .map(|href| href.trim().to_string())
}

/// Turn a minutes href into an absolute URL
///
/// Absolute links are kept, root-relative links are joined to the site root,
/// and anything else is taken relative to the meeting page's directory.
pub fn resolve_minutes_url(link: &str, meeting_url: &str, site_base_url: &str) -> String {
    if link.starts_with("http") {
        link.to_string()
    } else if link.starts_with('/') {
        format!("{}{}", site_base_url.trim_end_matches('/'), link)
    } else {
        let dir = meeting_url
            .rfind('/')
            .map(|pos| &meeting_url[..pos])
            .unwrap_or(meeting_url);
        format!("{}/{}", dir, link)
    }
}

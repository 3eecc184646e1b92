//! The meetings pipeline's item processor: minutes text, then decisions

use council_domain::traits::{ItemProcessor, LlmProvider, MinutesSource};
use council_domain::{MeetingDecision, MeetingRecord};
use council_extractor::{DecisionExtractor, ExtractorError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// A meeting plus whatever enrichment succeeded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedMeeting {
    /// The meeting as listed
    #[serde(flatten)]
    pub meeting: MeetingRecord,

    /// Plain text of the minutes, when they could be retrieved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_text: Option<String>,

    /// Extracted decisions, when an LLM is configured and minutes exist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decisions: Option<Vec<MeetingDecision>>,
}

/// Retrieves a meeting's minutes and extracts its decisions
///
/// Missing minutes are not an error: the meeting is returned without
/// decisions. A failed extraction is an error, which the pipeline turns
/// into an unenriched item.
pub struct MeetingEnricher<M, L> {
    minutes: Arc<M>,
    extractor: Option<Arc<DecisionExtractor<L>>>,
}

impl<M, L> MeetingEnricher<M, L>
where
    M: MinutesSource,
    L: LlmProvider,
{
    /// Create an enricher; without an extractor only minutes text is attached
    pub fn new(minutes: Arc<M>, extractor: Option<Arc<DecisionExtractor<L>>>) -> Self {
        Self { minutes, extractor }
    }

    /// Whether decisions will be extracted
    pub fn extracts_decisions(&self) -> bool {
        self.extractor.is_some()
    }
}

impl<M, L> ItemProcessor<MeetingRecord> for MeetingEnricher<M, L>
where
    M: MinutesSource,
    L: LlmProvider,
{
    type Output = EnrichedMeeting;
    type Error = ExtractorError;

    async fn process(&self, meeting: &MeetingRecord) -> Result<EnrichedMeeting, ExtractorError> {
        let pdf_text = self.minutes.minutes_text(meeting).await;

        let decisions = match (&self.extractor, pdf_text.as_deref()) {
            (Some(extractor), Some(text)) => {
                debug!("Meeting {}: extracting decisions", meeting.id);
                let decisions = extractor.extract_decisions(text).await?;
                info!("Meeting {}: extracted {} decisions", meeting.id, decisions.len());
                Some(decisions)
            }
            _ => None,
        };

        Ok(EnrichedMeeting {
            meeting: meeting.clone(),
            pdf_text,
            decisions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_extractor::ExtractorConfig;
    use council_llm::MockProvider;
    use serde_json::json;

    struct StaticMinutes(Option<&'static str>);

    impl MinutesSource for StaticMinutes {
        async fn minutes_text(&self, _meeting: &MeetingRecord) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    const DECISIONS: &str = r#"[{
        "title": "Bike lanes approved",
        "content": "THAT Council approve bike lanes on Main Street",
        "location": [49.2606, -123.1009],
        "summary": "Council approved bike lanes."
    }]"#;

    fn meeting() -> MeetingRecord {
        MeetingRecord::new(
            7,
            "Regular Council",
            "Held",
            "2026-01-15T09:30:00",
            "https://council.example.ca/20260115/regu.htm",
        )
    }

    fn enricher(
        minutes: Option<&'static str>,
        llm: Option<MockProvider>,
    ) -> MeetingEnricher<StaticMinutes, MockProvider> {
        MeetingEnricher::new(
            Arc::new(StaticMinutes(minutes)),
            llm.map(|llm| Arc::new(DecisionExtractor::new(llm, ExtractorConfig::default()))),
        )
    }

    #[tokio::test]
    async fn test_minutes_and_decisions() {
        let llm = MockProvider::new(DECISIONS);
        let enriched = enricher(Some("THAT Council approve bike lanes"), Some(llm.clone()))
            .process(&meeting())
            .await
            .unwrap();

        assert_eq!(enriched.meeting, meeting());
        assert_eq!(enriched.pdf_text.as_deref(), Some("THAT Council approve bike lanes"));
        assert_eq!(enriched.decisions.as_ref().map(Vec::len), Some(1));
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_no_minutes_skips_llm() {
        let llm = MockProvider::new(DECISIONS);
        let enriched = enricher(None, Some(llm.clone()))
            .process(&meeting())
            .await
            .unwrap();

        assert!(enriched.pdf_text.is_none());
        assert!(enriched.decisions.is_none());
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_llm_keeps_minutes_only() {
        let enricher = enricher(Some("minutes"), None);
        assert!(!enricher.extracts_decisions());

        let enriched = enricher.process(&meeting()).await.unwrap();
        assert_eq!(enriched.pdf_text.as_deref(), Some("minutes"));
        assert!(enriched.decisions.is_none());
    }

    #[tokio::test]
    async fn test_llm_failure_is_an_error() {
        let mut llm = MockProvider::default();
        llm.add_error("Minutes:");
        let result = enricher(Some("THAT Council adjourn"), Some(llm))
            .process(&meeting())
            .await;
        assert!(matches!(result, Err(ExtractorError::Llm(_))));
    }

    #[test]
    fn test_wire_shape() {
        let enriched = EnrichedMeeting {
            meeting: meeting(),
            pdf_text: None,
            decisions: Some(Vec::new()),
        };
        assert_eq!(
            serde_json::to_value(&enriched).unwrap(),
            json!({
                "id": 7,
                "meetingType": "Regular Council",
                "status": "Held",
                "eventDate": "2026-01-15T09:30:00",
                "meetingUrl": "https://council.example.ca/20260115/regu.htm",
                "decisions": []
            })
        );
    }
}

//! HTTP request handlers for the server.
//!
//! Implements the meetings stream, the sample endpoint, decision extraction
//! and the health check using axum.

use crate::enrich::MeetingEnricher;
use crate::sse::to_sse_event;
use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
    routing::{get, post},
    Router,
};
use chrono::{SecondsFormat, Utc};
use council_domain::traits::{ItemFetcher, LlmProvider, MinutesSource};
use council_domain::{DateRange, MeetingDecision, MeetingRecord};
use council_extractor::{DecisionExtractor, ExtractorConfig};
use council_pipeline::{ChannelSink, Pipeline, PipelineConfig, PipelineError};
use council_sources::{CouncilApiClient, MinutesClient};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Meetings returned by the sample endpoint
const SAMPLE_SIZE: usize = 10;

/// The pipeline the meetings stream runs
pub type MeetingPipeline<L, M = MinutesClient> =
    Pipeline<CouncilApiClient, MeetingEnricher<M, L>>;

/// Shared application state
///
/// Generic over the LLM provider and the minutes source so either can be
/// replaced in tests.
pub struct AppState<L, M = MinutesClient> {
    /// Pipeline for the meetings stream
    pub pipeline: Arc<MeetingPipeline<L, M>>,
    /// Extractor for the extraction endpoint; `None` without an LLM
    pub extractor: Option<Arc<DecisionExtractor<L>>>,
}

impl<L, M> Clone for AppState<L, M> {
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            extractor: self.extractor.clone(),
        }
    }
}

impl<L: LlmProvider, M: MinutesSource> AppState<L, M> {
    /// Wire the collaborators together
    ///
    /// The stream and the extraction endpoint share one LLM provider.
    pub fn new(
        council_api: CouncilApiClient,
        minutes: M,
        llm: Option<L>,
        extractor_config: ExtractorConfig,
        pipeline_config: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        let extractor = llm.map(|llm| Arc::new(DecisionExtractor::new(llm, extractor_config)));
        let enricher = MeetingEnricher::new(Arc::new(minutes), extractor.clone());
        let pipeline = Pipeline::new(council_api, enricher, pipeline_config)?;

        Ok(Self {
            pipeline: Arc::new(pipeline),
            extractor,
        })
    }
}

/// Date filter accepted by the meetings endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingsQuery {
    /// Earliest meeting date, `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// Latest meeting date, `YYYY-MM-DD`
    pub end_date: Option<String>,
}

impl MeetingsQuery {
    fn date_range(&self) -> Result<DateRange, AppError> {
        DateRange::parse(self.start_date.as_deref(), self.end_date.as_deref())
            .map_err(AppError::InvalidRequest)
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Always "ok"
    pub status: String,
    /// Server time, RFC 3339
    pub timestamp: String,
}

/// Sample endpoint response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleResponse {
    /// Always true
    pub success: bool,
    /// Meetings matching the filter
    pub total_count: usize,
    /// Meetings included below
    pub sample_count: usize,
    /// The first matching meetings, newest first
    pub meetings: Vec<MeetingRecord>,
}

/// Extraction request
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    /// Minutes text to extract decisions from
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Extraction response
#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractResponse {
    /// Always true
    pub success: bool,
    /// Decisions found
    pub decisions: Vec<MeetingDecision>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Present (false) on endpoints that report `success`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    /// Error category
    pub error: String,
    /// What went wrong
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Underlying cause
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Malformed request parameters or body
    InvalidRequest(String),
    /// A required collaborator is not configured
    NotConfigured(String),
    /// The meetings API failed
    FetchFailed(String),
    /// Decision extraction failed
    ExtractionFailed(String),
    /// No such route
    NotFound,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::InvalidRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    success: None,
                    error: "Invalid request".to_string(),
                    message: Some(message),
                    details: None,
                },
            ),
            AppError::NotConfigured(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    success: None,
                    error: "Server configuration error".to_string(),
                    message: Some(message),
                    details: None,
                },
            ),
            AppError::FetchFailed(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    success: Some(false),
                    error: "Failed to fetch meetings".to_string(),
                    message: Some(message),
                    details: None,
                },
            ),
            AppError::ExtractionFailed(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    success: None,
                    error: "Internal server error".to_string(),
                    message: Some("Failed to process the meeting minutes".to_string()),
                    details: Some(details),
                },
            ),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    success: None,
                    error: "Not found".to_string(),
                    message: None,
                    details: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// GET /api/meetings - Stream meetings with their decisions, newest first
///
/// The date filter is checked before the stream opens. After that every
/// outcome, including a failed fetch, arrives as an event.
async fn stream_meetings<L, M>(
    State(state): State<AppState<L, M>>,
    Query(query): Query<MeetingsQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError>
where
    L: LlmProvider + 'static,
    M: MinutesSource + 'static,
{
    let range = query.date_range()?;
    info!("Meetings stream requested ({})", range);

    let (sink, events) = ChannelSink::channel();
    let pipeline = state.pipeline.clone();
    tokio::spawn(async move {
        pipeline.run(&range, &sink).await;
    });

    let stream =
        UnboundedReceiverStream::new(events).map(|event| Ok::<_, Infallible>(to_sse_event(event)));
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// GET /api/meetings/test - Check API connectivity without extraction
async fn sample_meetings<L, M>(
    State(state): State<AppState<L, M>>,
    Query(query): Query<MeetingsQuery>,
) -> Result<Json<SampleResponse>, AppError>
where
    L: LlmProvider + 'static,
    M: MinutesSource + 'static,
{
    let range = query.date_range()?;

    let meetings = state
        .pipeline
        .fetcher()
        .fetch_ordered(&range)
        .await
        .map_err(|e| AppError::FetchFailed(e.to_string()))?;

    let total_count = meetings.len();
    let meetings: Vec<MeetingRecord> = meetings.into_iter().take(SAMPLE_SIZE).collect();

    Ok(Json(SampleResponse {
        success: true,
        total_count,
        sample_count: meetings.len(),
        meetings,
    }))
}

/// POST /api/extract-decisions - Extract decisions from posted minutes text
async fn extract_decisions<L, M>(
    State(state): State<AppState<L, M>>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, AppError>
where
    L: LlmProvider + 'static,
    M: MinutesSource + 'static,
{
    let prompt = request
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| {
            AppError::InvalidRequest(
                "Please provide a valid prompt string in the request body".to_string(),
            )
        })?;

    let extractor = state
        .extractor
        .as_ref()
        .ok_or_else(|| AppError::NotConfigured("GEMINI_API_KEY is not configured".to_string()))?;

    let decisions = extractor
        .extract_decisions(prompt)
        .await
        .map_err(|e| AppError::ExtractionFailed(e.to_string()))?;

    Ok(Json(ExtractResponse {
        success: true,
        decisions,
    }))
}

/// GET /health - Liveness check
async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

async fn not_found() -> AppError {
    AppError::NotFound
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Create the axum router with all routes
pub fn create_router<L, M>(state: AppState<L, M>, allowed_origins: &[String]) -> Router
where
    L: LlmProvider + 'static,
    M: MinutesSource + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/api/meetings", get(stream_meetings::<L, M>))
        .route("/api/meetings/test", get(sample_meetings::<L, M>))
        .route("/api/extract-decisions", post(extract_decisions::<L, M>))
        .fallback(not_found)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

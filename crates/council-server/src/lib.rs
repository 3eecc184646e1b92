//! Council Server
//!
//! HTTP backend for the council meetings map: streams meetings with
//! AI-extracted decisions over server-sent events, newest first.

#![warn(missing_docs)]

pub mod config;
pub mod enrich;
pub mod handlers;
pub mod sse;

use config::ServerConfig;
use council_llm::{GeminiProvider, LlmError};
use council_pipeline::PipelineError;
use council_sources::{CouncilApiClient, MinutesClient, SourceError};
use handlers::{create_router, AppState};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Meetings or minutes client could not be created
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// LLM provider could not be created
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Pipeline could not be created
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over `default_filter`. Calling twice is harmless.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        warn!("Tracing subscriber already installed");
    }
}

/// Build the application state from configuration
///
/// Without a Gemini API key the server still streams meetings, just
/// without decisions, and the extraction endpoint reports a configuration
/// error.
pub fn build_state(config: &ServerConfig) -> Result<AppState<GeminiProvider>, ServerError> {
    let council_api = CouncilApiClient::new(config.council_api.clone())?;
    let minutes = MinutesClient::new(config.minutes.clone())?;

    let llm = match config.llm.api_key() {
        Some(key) => Some(
            GeminiProvider::with_timeout(key, config.llm.model.as_str(), config.llm.timeout())?
                .with_endpoint(config.llm.endpoint.as_str())
                .with_max_attempts(config.llm.max_attempts),
        ),
        None => {
            warn!("GEMINI_API_KEY not set; meetings will stream without decisions");
            None
        }
    };

    Ok(AppState::new(
        council_api,
        minutes,
        llm,
        config.extractor.clone(),
        config.pipeline.clone(),
    )?)
}

/// Start the HTTP server
///
/// Validates configuration, wires the collaborators and serves until the
/// process exits.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    config.validate()?;

    info!("Starting council meetings server");
    info!("Meetings API: {}", config.council_api.base_url);
    info!("Workers per stream: {}", config.pipeline.worker_count);
    info!("LLM model: {}", config.llm.model);

    let state = build_state(&config)?;
    let app = create_router(state, &config.allowed_origins);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    info!("Health check: /health, meetings stream: /api/meetings");

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}

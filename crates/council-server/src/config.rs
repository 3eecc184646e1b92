//! Configuration file parsing for the server.
//!
//! Loads settings from TOML: bind address, CORS origins, log level, and one
//! section per collaborator. Environment variables override the file.

use council_extractor::ExtractorConfig;
use council_llm::gemini::{DEFAULT_ENDPOINT, DEFAULT_MAX_ATTEMPTS, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use council_pipeline::PipelineConfig;
use council_sources::{CouncilApiConfig, MinutesConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Upper bound on `llm.max_attempts`
pub const MAX_LLM_ATTEMPTS: u32 = 10;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A value is out of range or malformed
    #[error("Invalid configuration value: {0}")]
    Invalid(String),
}

/// LLM settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Gemini API key; without one, meetings stream without decisions
    pub api_key: Option<String>,

    /// Model name
    pub model: String,

    /// API endpoint
    pub endpoint: String,

    /// HTTP timeout per call (seconds)
    pub timeout_secs: u64,

    /// Attempts per call; 1 means no retries
    pub max_attempts: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl LlmConfig {
    /// Get the HTTP timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The API key, if one is set and non-blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Bind port (default: 3001)
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Origins allowed by CORS; `"*"` allows any
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Log filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Worker pool settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Meetings API settings
    #[serde(default)]
    pub council_api: CouncilApiConfig,

    /// Minutes retrieval settings
    #[serde(default)]
    pub minutes: MinutesConfig,

    /// LLM settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Decision extraction settings
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_bind_port() -> u16 {
    3001
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            allowed_origins: default_allowed_origins(),
            log_level: default_log_level(),
            pipeline: PipelineConfig::default(),
            council_api: CouncilApiConfig::default(),
            minutes: MinutesConfig::default(),
            llm: LlmConfig::default(),
            extractor: ExtractorConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 0,
            allowed_origins: vec!["http://localhost:5173".to_string()],
            log_level: "debug".to_string(),
            ..ServerConfig::default()
        }
    }

    /// Check every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(ConfigError::Invalid("bind_address is empty".to_string()));
        }
        self.pipeline
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.extractor
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if !(1..=MAX_LLM_ATTEMPTS).contains(&self.llm.max_attempts) {
            return Err(ConfigError::Invalid(format!(
                "llm.max_attempts must be between 1 and {}",
                MAX_LLM_ATTEMPTS
            )));
        }
        if self.council_api.timeout_secs == 0
            || self.minutes.page_timeout_secs == 0
            || self.minutes.pdf_timeout_secs == 0
            || self.llm.timeout_secs == 0
        {
            return Err(ConfigError::Invalid("timeouts must be greater than 0".to_string()));
        }
        Ok(())
    }

    /// Apply `PORT`, `GEMINI_API_KEY`, `COUNCIL_API_KEY` and `COUNCIL_API_BASE_URL`
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Apply environment overrides from an arbitrary lookup
    pub fn apply_env_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(port) = var("PORT") {
            self.bind_port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT is not a port number: {}", port)))?;
        }
        if let Some(key) = var("GEMINI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(key) = var("COUNCIL_API_KEY") {
            self.council_api.api_key = Some(key);
        }
        if let Some(url) = var("COUNCIL_API_BASE_URL") {
            self.council_api.base_url = url;
        }
        Ok(())
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_sources::ApiKeyLocation;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:3001");
        assert_eq!(config.pipeline.worker_count, 3);
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert_eq!(config.llm.max_attempts, 1);
        assert_eq!(config.minutes.link_text, "read the minutes");
        assert!(config.llm.api_key().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_test_config_binds_ephemeral_port() {
        let config = ServerConfig::default_test_config();
        assert_eq!(config.bind_addr(), "127.0.0.1:0");
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            bind_address = "127.0.0.1"
            bind_port = 8080
            allowed_origins = ["https://meetings.example.ca"]

            [pipeline]
            worker_count = 5

            [council_api]
            api_key = "abc"
            api_key_location = "query"
            api_key_name = "apikey"

            [minutes]
            pdf_timeout_secs = 90

            [llm]
            model = "gemini-2.5-pro"
            max_attempts = 3

            [extractor]
            max_chunk_size = 100000
        "#;

        let config: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.allowed_origins, vec!["https://meetings.example.ca"]);
        assert_eq!(config.pipeline.worker_count, 5);
        assert_eq!(config.council_api.api_key.as_deref(), Some("abc"));
        assert_eq!(config.council_api.api_key_location, ApiKeyLocation::Query);
        assert_eq!(config.council_api.meeting_type, "previous");
        assert_eq!(config.minutes.pdf_timeout_secs, 90);
        assert_eq!(config.minutes.page_timeout_secs, 30);
        assert_eq!(config.llm.model, "gemini-2.5-pro");
        assert_eq!(config.extractor.max_chunk_size, 100_000);
        assert_eq!(config.extractor.max_text_length, 600_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let mut config = ServerConfig::default();
        config.pipeline.worker_count = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_bounds_llm_attempts() {
        let mut config = ServerConfig::default();
        config.llm.max_attempts = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.llm.max_attempts = MAX_LLM_ATTEMPTS;
        assert!(config.validate().is_ok());

        config.llm.max_attempts = MAX_LLM_ATTEMPTS + 1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("PORT", "4000"),
            ("GEMINI_API_KEY", "gem"),
            ("COUNCIL_API_KEY", "council"),
            ("COUNCIL_API_BASE_URL", "http://localhost:9999/api"),
        ]
        .into_iter()
        .collect();

        let mut config = ServerConfig::default();
        config
            .apply_env_from(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.bind_port, 4000);
        assert_eq!(config.llm.api_key(), Some("gem"));
        assert_eq!(config.council_api.api_key.as_deref(), Some("council"));
        assert_eq!(config.council_api.base_url, "http://localhost:9999/api");
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let mut config = ServerConfig::default();
        config
            .apply_env_from(|name| (name == "GEMINI_API_KEY").then(|| "  ".to_string()))
            .unwrap();
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let mut config = ServerConfig::default();
        let result = config.apply_env_from(|name| (name == "PORT").then(|| "http".to_string()));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}

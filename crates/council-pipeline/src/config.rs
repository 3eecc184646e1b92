//! Configuration for pipeline runs

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// Worker pool size used when nothing else is configured
pub const DEFAULT_WORKER_COUNT: usize = 3;

/// Configuration for a [`Pipeline`](crate::Pipeline)
///
/// # Examples
///
/// ```
/// use council_pipeline::PipelineConfig;
///
/// let config = PipelineConfig::default();
/// assert_eq!(config.worker_count, 3);
///
/// let config = PipelineConfig::with_workers(8);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of concurrent workers per run
    ///
    /// Fixed for the life of a run and independent of the item count.
    pub worker_count: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
        }
    }
}

impl PipelineConfig {
    /// Configuration with an explicit worker count
    pub fn with_workers(worker_count: usize) -> Self {
        Self { worker_count }
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.worker_count == 0 {
            return Err(PipelineError::Config(
                "worker_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.worker_count, DEFAULT_WORKER_COUNT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let result = PipelineConfig::with_workers(0).validate();
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }
}

//! Runtime configuration for the decision pipeline.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::providers::CompletionConfig;
use crate::resilience::CircuitBreakerConfig;
use crate::stages::Stage;

/// Configuration for the decision pipeline and its stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Model used for every stage
    pub model: String,

    /// Per-call timeout for any stage
    #[serde(with = "human_duration")]
    pub stage_timeout: Duration,

    /// Retries per stage on retryable provider errors
    pub max_retries: usize,

    /// Requests allowed per caller per rate window
    pub max_requests_per_window: usize,

    /// Rate limiting window
    #[serde(with = "human_duration")]
    pub rate_window: Duration,

    /// Token budget across all stages of a pipeline
    pub global_max_tokens: u32,

    /// Token budget per stage
    pub stage_max_tokens: u32,

    /// Circuit breaker settings shared by all stages
    pub circuit_breaker: CircuitBreakerConfig,

    /// Council cache capacity
    pub cache_entries: u64,

    /// Council cache entry lifetime
    #[serde(with = "human_duration")]
    pub cache_ttl: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            model: "gemini-3-flash-preview".to_string(),
            stage_timeout: Duration::from_secs(15),
            max_retries: 2,
            max_requests_per_window: 10,
            rate_window: Duration::from_secs(60),
            global_max_tokens: 10_000,
            stage_max_tokens: 3_000,
            circuit_breaker: CircuitBreakerConfig::default(),
            cache_entries: 1_024,
            cache_ttl: Duration::from_secs(3600),
        }
    }
}

impl RuntimeConfig {
    /// Output token ceiling for a stage.
    pub fn max_output_tokens(&self, stage: Stage) -> u32 {
        match stage {
            Stage::Bias => 500,
            Stage::Gatekeeper => 1500,
            Stage::Council => 2000,
            Stage::Optimizer => 500,
        }
    }

    /// Sampling temperature for a stage. Extraction stages run close to
    /// deterministic; the optimizer gets a little more room.
    pub fn temperature(&self, stage: Stage) -> f32 {
        match stage {
            Stage::Bias => 0.1,
            Stage::Gatekeeper => 0.1,
            Stage::Council => 0.2,
            Stage::Optimizer => 0.3,
        }
    }

    /// Build the completion settings for a stage.
    pub fn completion_for(&self, stage: Stage) -> CompletionConfig {
        CompletionConfig {
            model: self.model.clone(),
            max_tokens: self.max_output_tokens(stage),
            temperature: self.temperature(stage),
            timeout: self.stage_timeout,
            json_output: true,
        }
    }
}

mod human_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.model, "gemini-3-flash-preview");
        assert_eq!(config.stage_timeout, Duration::from_secs(15));
        assert_eq!(config.max_requests_per_window, 10);
    }

    #[test]
    fn test_per_stage_completion() {
        let config = RuntimeConfig::default();

        let council = config.completion_for(Stage::Council);
        assert_eq!(council.max_tokens, 2000);
        assert!((council.temperature - 0.2).abs() < f32::EPSILON);
        assert!(council.json_output);

        let optimizer = config.completion_for(Stage::Optimizer);
        assert_eq!(optimizer.max_tokens, 500);
        assert!((optimizer.temperature - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_human_durations_round_trip() {
        let config = RuntimeConfig {
            stage_timeout: Duration::from_secs(20),
            ..Default::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"20s\""));

        let parsed: RuntimeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.stage_timeout, Duration::from_secs(20));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: RuntimeConfig =
            serde_json::from_str(r#"{"model": "gemini-3-pro", "stage_timeout": "30s"}"#).unwrap();
        assert_eq!(parsed.model, "gemini-3-pro");
        assert_eq!(parsed.stage_timeout, Duration::from_secs(30));
        assert_eq!(parsed.max_retries, 2);
    }
}

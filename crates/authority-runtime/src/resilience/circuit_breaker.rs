//! Circuit breaker to prevent cascade failures.
//!
//! When a stage's LLM calls fail repeatedly, its circuit opens and
//! subsequent calls skip the provider entirely until the recovery
//! timeout passes.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::stages::Stage;

/// Circuit breaker configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CircuitBreakerConfig {
    /// Failures before opening circuit
    pub failure_threshold: u32,

    /// Time before attempting recovery (in seconds)
    #[serde(with = "duration_secs")]
    pub recovery_timeout: Duration,

    /// Successes needed to close circuit
    pub success_threshold: u32,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

/// State of a circuit.
#[derive(Debug, Clone)]
pub enum CircuitState {
    /// Normal operation
    Closed { failures: u32 },

    /// Circuit is open, all calls bypass
    Open { opened_at: Instant },

    /// Testing if circuit can close
    HalfOpen { successes: u32 },
}

/// Circuit breaker prevents cascade failures.
///
/// Each stage has its own circuit to allow independent recovery.
pub struct CircuitBreaker {
    states: RwLock<HashMap<Stage, CircuitState>>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    /// Create a new circuit breaker.
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Check if circuit is open for a stage.
    ///
    /// Returns true if calls should skip the provider.
    pub fn is_open(&self, stage: Stage) -> bool {
        let states = self.states.read();
        match states.get(&stage) {
            Some(CircuitState::Open { opened_at }) => {
                if opened_at.elapsed() >= self.config.recovery_timeout {
                    drop(states);
                    self.transition_to_half_open(stage);
                    false
                } else {
                    true
                }
            }
            Some(CircuitState::HalfOpen { .. }) => false, // Allow test calls
            _ => false,
        }
    }

    /// Record a successful LLM call.
    pub fn record_success(&self, stage: Stage) {
        let mut states = self.states.write();
        match states.get(&stage).cloned() {
            Some(CircuitState::HalfOpen { successes }) => {
                if successes + 1 >= self.config.success_threshold {
                    states.insert(stage, CircuitState::Closed { failures: 0 });
                    tracing::info!(stage = %stage, "Circuit closed after successful recovery");
                } else {
                    states.insert(
                        stage,
                        CircuitState::HalfOpen {
                            successes: successes + 1,
                        },
                    );
                }
            }
            Some(CircuitState::Closed { .. }) => {
                // Reset failures on success
                states.insert(stage, CircuitState::Closed { failures: 0 });
            }
            _ => {}
        }
    }

    /// Record a failed LLM call.
    pub fn record_failure(&self, stage: Stage) {
        let mut states = self.states.write();
        match states.get(&stage).cloned() {
            Some(CircuitState::Closed { failures }) => {
                if failures + 1 >= self.config.failure_threshold {
                    states.insert(
                        stage,
                        CircuitState::Open {
                            opened_at: Instant::now(),
                        },
                    );
                    tracing::warn!(
                        stage = %stage,
                        failures = failures + 1,
                        "Circuit opened after repeated failures"
                    );
                } else {
                    states.insert(
                        stage,
                        CircuitState::Closed {
                            failures: failures + 1,
                        },
                    );
                }
            }
            Some(CircuitState::HalfOpen { .. }) => {
                // Failed during recovery, reopen
                states.insert(
                    stage,
                    CircuitState::Open {
                        opened_at: Instant::now(),
                    },
                );
                tracing::warn!(stage = %stage, "Circuit reopened after failed recovery attempt");
            }
            None => {
                // First failure
                states.insert(stage, CircuitState::Closed { failures: 1 });
            }
            _ => {}
        }
    }

    /// Transition circuit to half-open state.
    fn transition_to_half_open(&self, stage: Stage) {
        let mut states = self.states.write();
        if matches!(states.get(&stage), Some(CircuitState::Open { .. })) {
            states.insert(stage, CircuitState::HalfOpen { successes: 0 });
            tracing::info!(stage = %stage, "Circuit transitioning to half-open for recovery test");
        }
    }

    /// Get current state of a circuit.
    pub fn state(&self, stage: Stage) -> CircuitState {
        self.states
            .read()
            .get(&stage)
            .cloned()
            .unwrap_or(CircuitState::Closed { failures: 0 })
    }

    /// Reset all circuits to closed.
    pub fn reset(&self) {
        self.states.write().clear();
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circuit_starts_closed() {
        let cb = CircuitBreaker::default();
        assert!(!cb.is_open(Stage::Council));
    }

    #[test]
    fn test_circuit_opens_after_failures() {
        let config = CircuitBreakerConfig {
            failure_threshold: 2,
            ..Default::default()
        };
        let cb = CircuitBreaker::new(config);

        cb.record_failure(Stage::Council);
        assert!(!cb.is_open(Stage::Council));

        cb.record_failure(Stage::Council);
        assert!(cb.is_open(Stage::Council));
    }

    #[test]
    fn test_success_resets_failures() {
        let cb = CircuitBreaker::default();

        cb.record_failure(Stage::Gatekeeper);
        cb.record_failure(Stage::Gatekeeper);

        // Success should reset
        cb.record_success(Stage::Gatekeeper);

        // Need 3 more failures to open
        cb.record_failure(Stage::Gatekeeper);
        cb.record_failure(Stage::Gatekeeper);
        assert!(!cb.is_open(Stage::Gatekeeper));
    }

    #[test]
    fn test_stages_are_independent() {
        let config = CircuitBreakerConfig {
            failure_threshold: 2,
            ..Default::default()
        };
        let cb = CircuitBreaker::new(config);

        // Open the council circuit
        cb.record_failure(Stage::Council);
        cb.record_failure(Stage::Council);

        // Council is open, but bias is closed
        assert!(cb.is_open(Stage::Council));
        assert!(!cb.is_open(Stage::Bias));
    }
}

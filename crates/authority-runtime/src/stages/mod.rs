//! Collaborator stages backed by the LLM provider.
//!
//! Each stage is isolated: no shared mutable state, no access to another
//! stage's output except what the pipeline passes explicitly. Stages
//! produce *structured data*; the verdict itself comes only from the
//! deterministic gate in authority-core.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError,
};
use crate::resilience::{BudgetTracker, CircuitBreaker};

mod bias;
mod council;
mod gatekeeper;
mod optimizer;

pub use bias::{BiasLevel, BiasScreen, BiasScreener};
pub use council::SensorCouncil;
pub use gatekeeper::{DecisionBrief, Extraction, Gatekeeper, Irreversibility};
pub use optimizer::StrategicOptimizer;

/// The four LLM-backed stages of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Bias,
    Gatekeeper,
    Council,
    Optimizer,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Bias,
        Stage::Gatekeeper,
        Stage::Council,
        Stage::Optimizer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Bias => "bias",
            Stage::Gatekeeper => "gatekeeper",
            Stage::Council => "council",
            Stage::Optimizer => "optimizer",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from collaborator stages.
#[derive(Error, Debug)]
pub enum StageError {
    #[error("Provider call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Could not parse model reply: {0}")]
    Reply(String),

    #[error("{stage} unavailable: circuit open")]
    CircuitOpen { stage: Stage },

    #[error("Token budget exceeded for {stage}")]
    BudgetExceeded { stage: Stage },

    #[error("{stage} timed out after {timeout:?}")]
    Timeout { stage: Stage, timeout: Duration },
}

/// Shared plumbing for provider calls: circuit breaker, budget, retry
/// with backoff, and a per-call timeout.
#[derive(Clone)]
pub(crate) struct StageContext {
    pub provider: Arc<dyn LlmProvider>,
    pub breaker: Arc<CircuitBreaker>,
    pub budget: Arc<BudgetTracker>,
    pub max_retries: usize,
}

impl StageContext {
    /// Run a completion for a stage with the full resilience stack.
    pub async fn complete(
        &self,
        stage: Stage,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, StageError> {
        if self.breaker.is_open(stage) {
            return Err(StageError::CircuitOpen { stage });
        }

        let estimate: u32 = messages
            .iter()
            .map(|m| self.provider.estimate_tokens(&m.content))
            .sum::<u32>()
            + config.max_tokens;
        if !self.budget.can_afford(stage, estimate) {
            return Err(StageError::BudgetExceeded { stage });
        }

        let call = || {
            let messages = messages.clone();
            async move { self.provider.complete(messages, config).await }
        };

        let attempt = call
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(Duration::from_millis(1500))
                    .with_max_times(self.max_retries),
            )
            .when(ProviderError::is_retryable)
            .notify(|err: &ProviderError, backoff: Duration| {
                tracing::warn!(stage = %stage, error = %err, backoff = ?backoff, "retrying provider call");
            });

        match tokio::time::timeout(config.timeout, attempt).await {
            Ok(Ok(response)) => {
                self.breaker.record_success(stage);
                self.budget.record_usage(stage, &response.usage, &response.model);
                Ok(response)
            }
            Ok(Err(e)) => {
                tracing::warn!(stage = %stage, error = %e, "stage call failed");
                self.breaker.record_failure(stage);
                Err(StageError::Provider(e))
            }
            Err(_) => {
                tracing::warn!(stage = %stage, timeout = ?config.timeout, "stage call timed out");
                self.breaker.record_failure(stage);
                Err(StageError::Timeout {
                    stage,
                    timeout: config.timeout,
                })
            }
        }
    }
}

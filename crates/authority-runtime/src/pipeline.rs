//! The decision pipeline: collaborator stages around the deterministic gate.
//!
//! Execution flow per request:
//! 1. Rate-limit check for the caller
//! 2. Input validation and sanitization
//! 3. Fan-out: bias screen and gatekeeper run concurrently
//! 4. Sensor council (cached, circuit-broken, budgeted)
//! 5. Fan-in: the deterministic gate in authority-core (NO LLM)
//! 6. Optimizer, only when the verdict is not APPROVED
//!
//! The pipeline holds no per-request state; every request is independent.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use authority_core::{CouncilReport, DecisionCard, ReportError, Verdict};

use crate::cache::{CacheKey, CouncilCache};
use crate::config::RuntimeConfig;
use crate::providers::LlmProvider;
use crate::resilience::{BudgetTracker, CircuitBreaker, LlmUsage, RateLimiter};
use crate::security::{self, InputError};
use crate::stages::{
    BiasLevel, BiasScreen, BiasScreener, DecisionBrief, Extraction, Gatekeeper, SensorCouncil,
    Stage, StageContext, StageError, StrategicOptimizer,
};

/// Errors and rejections from the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Too many requests. Please wait {} seconds.", .retry_after.as_secs())]
    RateLimited { retry_after: std::time::Duration },

    #[error(transparent)]
    InvalidInput(#[from] InputError),

    #[error("Input too emotionally charged (score {}). Please rephrase objectively.", .screen.score)]
    BiasRejected { screen: BiasScreen },

    #[error("Incomplete decision: {question}")]
    Incomplete {
        missing_field: String,
        question: String,
        bias: BiasScreen,
    },

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Pipeline not configured: {0}")]
    NotConfigured(String),
}

/// Everything a successful run produces.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionOutcome {
    /// The gate's verdict card
    pub card: DecisionCard,

    /// Sensor analyses behind the card
    pub council: CouncilReport,

    /// The structured brief the sensors scored
    pub brief: DecisionBrief,

    /// The bias screen that let this request through
    pub bias: BiasScreen,

    /// Optimizer suggestions; present only for non-approved verdicts
    pub suggestions: Option<Vec<String>>,

    /// Accumulated LLM usage on this pipeline
    pub usage: LlmUsage,

    /// Envelope timestamp. The card itself carries none.
    pub decided_at: DateTime<Utc>,
}

/// The decision pipeline.
pub struct DecisionPipeline {
    config: RuntimeConfig,
    budget: Arc<BudgetTracker>,
    limiter: RateLimiter,
    cache: CouncilCache,
    bias: BiasScreener,
    gatekeeper: Gatekeeper,
    council: SensorCouncil,
    optimizer: StrategicOptimizer,
}

impl DecisionPipeline {
    /// Create a pipeline with the given provider and configuration.
    pub fn new(provider: Arc<dyn LlmProvider>, config: RuntimeConfig) -> Self {
        let breaker = Arc::new(CircuitBreaker::new(config.circuit_breaker.clone()));
        let budget = Arc::new(BudgetTracker::new(
            config.global_max_tokens,
            config.stage_max_tokens,
        ));

        let ctx = StageContext {
            provider,
            breaker,
            budget: Arc::clone(&budget),
            max_retries: config.max_retries,
        };

        Self {
            bias: BiasScreener::new(ctx.clone(), config.completion_for(Stage::Bias)),
            gatekeeper: Gatekeeper::new(ctx.clone(), config.completion_for(Stage::Gatekeeper)),
            council: SensorCouncil::new(ctx.clone(), config.completion_for(Stage::Council)),
            optimizer: StrategicOptimizer::new(ctx, config.completion_for(Stage::Optimizer)),
            limiter: RateLimiter::new(config.max_requests_per_window, config.rate_window),
            cache: CouncilCache::new(config.cache_entries, config.cache_ttl),
            budget,
            config,
        }
    }

    /// Start building a pipeline.
    pub fn builder() -> DecisionPipelineBuilder {
        DecisionPipelineBuilder::new()
    }

    /// Run the full pipeline for one request.
    ///
    /// `caller` identifies the requester for rate limiting; pass a stable
    /// identifier such as a client address.
    pub async fn decide(
        &self,
        message: &str,
        caller: &str,
    ) -> Result<DecisionOutcome, PipelineError> {
        self.limiter
            .check(caller)
            .map_err(|retry_after| PipelineError::RateLimited { retry_after })?;

        security::validate_input(message)?;
        let message = security::sanitize_input(message);

        // Fan-out: both stages only need the sanitized message
        let (screen, extraction) = tokio::join!(
            self.bias.screen(&message),
            self.gatekeeper.extract(&message),
        );

        if screen.level == BiasLevel::High {
            tracing::info!(score = screen.score, "request rejected for emotional bias");
            return Err(PipelineError::BiasRejected { screen });
        }

        let brief = match extraction? {
            Extraction::Complete(brief) => brief,
            Extraction::Incomplete {
                missing_field,
                question,
            } => {
                tracing::info!(field = %missing_field, "extraction incomplete");
                return Err(PipelineError::Incomplete {
                    missing_field,
                    question,
                    bias: screen,
                });
            }
        };

        let report = self.council_with_cache(&brief).await?;

        // Fan-in: deterministic gate, no LLM
        let card = authority_core::decide(&report)?;
        tracing::info!(verdict = %card.verdict, overall = card.scores.overall, "gate decided");

        let suggestions = if card.verdict != Verdict::Approved {
            Some(self.optimizer.optimize(&brief, &report, &card).await)
        } else {
            None
        };

        Ok(DecisionOutcome {
            card,
            council: report,
            brief,
            bias: screen,
            suggestions,
            usage: self.budget.get_usage(),
            decided_at: Utc::now(),
        })
    }

    async fn council_with_cache(
        &self,
        brief: &DecisionBrief,
    ) -> Result<CouncilReport, PipelineError> {
        let key = CacheKey::new(brief, &self.config.model);

        if let Some(report) = self.cache.get(&key).await {
            tracing::debug!("council cache hit");
            return Ok(report);
        }

        let report = self.council.analyze(brief).await?;
        self.cache.insert(key, report.clone()).await;
        Ok(report)
    }

    /// Accumulated LLM usage on this pipeline.
    pub fn usage(&self) -> LlmUsage {
        self.budget.get_usage()
    }

    /// Reset the token budgets, e.g. between accounting periods.
    pub fn reset_budget(&self) {
        self.budget.reset();
    }

    /// Drop stale rate-limiter entries.
    pub fn cleanup(&self) {
        self.limiter.cleanup();
    }
}

/// Builder for [`DecisionPipeline`].
pub struct DecisionPipelineBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    config: RuntimeConfig,
}

impl DecisionPipelineBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            config: RuntimeConfig::default(),
        }
    }

    /// Set the LLM provider.
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the configuration.
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the pipeline.
    pub fn build(self) -> Result<DecisionPipeline, PipelineError> {
        let provider = self
            .provider
            .ok_or_else(|| PipelineError::NotConfigured("No provider set".to_string()))?;

        Ok(DecisionPipeline::new(provider, self.config))
    }
}

impl Default for DecisionPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

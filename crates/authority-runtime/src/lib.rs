//! # authority-runtime
//!
//! LLM collaborator stages and decision pipeline for Authority.
//!
//! This crate wraps the deterministic gate in `authority-core` with the
//! stages that talk to a generative model: an emotional bias screen, an
//! input gatekeeper, the sensor council, and a strategic optimizer.
//!
//! ## Important
//!
//! The stages produce *structured data* for the gate; they never decide.
//! The verdict on every decision card comes only from `authority-core`,
//! which is fully deterministic and never makes LLM calls.
//!
//! ## Example
//!
//! ```rust,ignore
//! use authority_runtime::{DecisionPipeline, GeminiProvider, RuntimeConfig};
//! use std::sync::Arc;
//!
//! let pipeline = DecisionPipeline::builder()
//!     .provider(Arc::new(GeminiProvider::from_env()?))
//!     .config(RuntimeConfig::default())
//!     .build()?;
//!
//! let outcome = pipeline.decide("Should I quit my job to...", "cli").await?;
//! println!("{}", outcome.card.verdict);
//! ```

pub mod cache;
pub mod config;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod repair;
pub mod resilience;
pub mod security;
pub mod stages;

// Re-export main types at crate root
pub use config::RuntimeConfig;
pub use pipeline::{DecisionOutcome, DecisionPipeline, DecisionPipelineBuilder, PipelineError};
pub use providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError,
    ProviderRegistry, TokenUsage,
};
pub use resilience::{BudgetTracker, CircuitBreaker, CircuitBreakerConfig, LlmUsage, RateLimiter};
pub use security::{sanitize_input, validate_input, InputError};
pub use stages::{
    BiasLevel, BiasScreen, DecisionBrief, Extraction, Irreversibility, Stage, StageError,
};

#[cfg(feature = "gemini")]
pub use providers::{GeminiProvider, GeminiProviderFactory, GEMINI_API_KEY_ENV};

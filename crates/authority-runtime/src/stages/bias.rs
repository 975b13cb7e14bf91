//! Emotional bias screen: scores the raw message before processing.
//!
//! A HIGH screen rejects the request before any further model calls.
//! A failed screen degrades to MEDIUM, never to a silent pass, so charged
//! inputs cannot slip through during outages.

use serde::{Deserialize, Serialize};

use crate::prompts::BIAS_SCREEN_PROMPT;
use crate::providers::{ChatMessage, CompletionConfig};
use crate::repair;

use super::{Stage, StageContext};

/// Emotional bias level classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BiasLevel {
    /// 0-40: mostly objective
    Low,

    /// 41-70: noticeable bias, proceed with warning
    Medium,

    /// 71-100: too emotional, requires rephrasing
    High,
}

impl BiasLevel {
    pub fn from_score(score: u8) -> Self {
        if score > 70 {
            BiasLevel::High
        } else if score > 40 {
            BiasLevel::Medium
        } else {
            BiasLevel::Low
        }
    }
}

/// Result of the emotional bias screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasScreen {
    /// Emotional bias score 0-100
    pub score: u8,

    pub level: BiasLevel,

    /// Phrases the screen flagged as charged
    pub flagged_phrases: Vec<String>,

    /// Objective rephrasing suggestion when the score is high
    pub suggestion: Option<String>,
}

impl BiasScreen {
    /// Neutral screen used when no screening is possible by design.
    pub fn neutral() -> Self {
        Self {
            score: 0,
            level: BiasLevel::Low,
            flagged_phrases: Vec::new(),
            suggestion: None,
        }
    }

    /// Degraded screen used when the stage fails: medium caution, never
    /// a silent pass.
    pub fn degraded() -> Self {
        Self {
            score: 50,
            level: BiasLevel::Medium,
            flagged_phrases: vec!["(analysis unavailable - proceeding with caution)".to_string()],
            suggestion: Some(
                "The screen is unavailable right now. Please ensure your input is objective."
                    .to_string(),
            ),
        }
    }
}

/// The bias screen stage.
pub struct BiasScreener {
    ctx: StageContext,
    completion: CompletionConfig,
}

impl BiasScreener {
    pub(crate) fn new(ctx: StageContext, completion: CompletionConfig) -> Self {
        Self { ctx, completion }
    }

    /// Screen a message for emotional charge. Infallible: failures
    /// degrade to a MEDIUM screen.
    pub async fn screen(&self, message: &str) -> BiasScreen {
        let messages = vec![
            ChatMessage::system(BIAS_SCREEN_PROMPT),
            ChatMessage::user(format!("INPUT:\n{}", message)),
        ];

        let response = match self.ctx.complete(Stage::Bias, messages, &self.completion).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "bias screen failed, degrading to medium");
                return BiasScreen::degraded();
            }
        };

        match Self::parse_reply(&response.content) {
            Some(screen) => {
                tracing::debug!(score = screen.score, level = ?screen.level, "bias screen complete");
                screen
            }
            None => {
                tracing::warn!("bias screen reply unparseable, degrading to medium");
                BiasScreen::degraded()
            }
        }
    }

    fn parse_reply(content: &str) -> Option<BiasScreen> {
        let value = repair::parse_lenient(content).ok()?;

        let score = value["bias_score"].as_u64()?.min(100) as u8;
        let flagged_phrases = value["flagged_phrases"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        let suggestion = value["suggestion"].as_str().map(str::to_string);

        Some(BiasScreen {
            score,
            level: BiasLevel::from_score(score),
            flagged_phrases,
            suggestion,
        })
    }
}

//! Input gatekeeper: extracts structured decision fields from free text.
//!
//! One model call parses the message into a [`DecisionBrief`]. Missing or
//! unclear fields yield an incomplete outcome with a follow-up question
//! instead of a guess.

use serde::{Deserialize, Serialize};

use crate::prompts::GATEKEEPER_PROMPT;
use crate::providers::{ChatMessage, CompletionConfig};
use crate::repair;

use super::{Stage, StageContext, StageError};

/// Can the decision be undone once made?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Irreversibility {
    Yes,
    No,
    Partial,
}

impl Irreversibility {
    /// Normalize the model's free-form answer.
    fn from_reply(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "yes" | "true" | "1" => Irreversibility::Yes,
            "no" | "false" | "0" => Irreversibility::No,
            _ => Irreversibility::Partial,
        }
    }
}

/// Structured decision fields extracted from user input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecisionBrief {
    /// What the user wants to achieve
    pub goal: String,

    /// What the user must sacrifice or invest
    pub cost: String,

    /// What could go wrong
    pub risk: String,

    /// Whether the decision can be undone
    pub irreversible: Irreversibility,
}

/// Outcome of field extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Complete(DecisionBrief),

    Incomplete {
        missing_field: String,
        question: String,
    },
}

const REQUIRED_FIELDS: [&str; 4] = ["goal", "cost", "risk", "irreversible"];

fn question_for(field: &str) -> &'static str {
    match field {
        "goal" => "What specific outcome are you trying to achieve?",
        "cost" => "What will you sacrifice or invest? (money, time, effort, etc.)",
        "risk" => "What could go wrong with this decision?",
        _ => "Can this decision be undone? (yes / no / partially)",
    }
}

/// The gatekeeper stage.
pub struct Gatekeeper {
    ctx: StageContext,
    completion: CompletionConfig,
}

impl Gatekeeper {
    pub(crate) fn new(ctx: StageContext, completion: CompletionConfig) -> Self {
        Self { ctx, completion }
    }

    /// Extract decision fields from sanitized user input.
    pub async fn extract(&self, message: &str) -> Result<Extraction, StageError> {
        let messages = vec![
            ChatMessage::system(GATEKEEPER_PROMPT),
            ChatMessage::user(format!("USER INPUT:\n{}", message)),
        ];

        let response = self
            .ctx
            .complete(Stage::Gatekeeper, messages, &self.completion)
            .await?;

        let value = repair::parse_lenient(&response.content)
            .map_err(|e| StageError::Reply(e.to_string()))?;

        Ok(Self::validate_fields(&value))
    }

    /// Check the extracted fields and build the outcome.
    fn validate_fields(value: &serde_json::Value) -> Extraction {
        for field in REQUIRED_FIELDS {
            let raw = value[field].as_str().unwrap_or("").trim().to_string();
            if raw.is_empty() || raw.eq_ignore_ascii_case("unclear") {
                tracing::debug!(field, "extraction incomplete");
                return Extraction::Incomplete {
                    missing_field: field.to_string(),
                    question: question_for(field).to_string(),
                };
            }
        }

        Extraction::Complete(DecisionBrief {
            goal: value["goal"].as_str().unwrap_or_default().trim().to_string(),
            cost: value["cost"].as_str().unwrap_or_default().trim().to_string(),
            risk: value["risk"].as_str().unwrap_or_default().trim().to_string(),
            irreversible: Irreversibility::from_reply(
                value["irreversible"].as_str().unwrap_or_default(),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_extraction() {
        let value = serde_json::json!({
            "goal": "open a bakery",
            "cost": "life savings and two years",
            "risk": "the shop fails in year one",
            "irreversible": "partial"
        });

        match Gatekeeper::validate_fields(&value) {
            Extraction::Complete(brief) => {
                assert_eq!(brief.goal, "open a bakery");
                assert_eq!(brief.irreversible, Irreversibility::Partial);
            }
            other => panic!("expected complete, got {:?}", other),
        }
    }

    #[test]
    fn test_unclear_field_is_incomplete() {
        let value = serde_json::json!({
            "goal": "UNCLEAR",
            "cost": "savings",
            "risk": "failure",
            "irreversible": "no"
        });

        match Gatekeeper::validate_fields(&value) {
            Extraction::Incomplete {
                missing_field,
                question,
            } => {
                assert_eq!(missing_field, "goal");
                assert!(question.contains("outcome"));
            }
            other => panic!("expected incomplete, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_field_is_incomplete() {
        let value = serde_json::json!({
            "goal": "open a bakery",
            "risk": "failure",
            "irreversible": "no"
        });

        match Gatekeeper::validate_fields(&value) {
            Extraction::Incomplete { missing_field, .. } => {
                assert_eq!(missing_field, "cost");
            }
            other => panic!("expected incomplete, got {:?}", other),
        }
    }

    #[test]
    fn test_irreversibility_normalization() {
        assert_eq!(Irreversibility::from_reply("YES"), Irreversibility::Yes);
        assert_eq!(Irreversibility::from_reply("true"), Irreversibility::Yes);
        assert_eq!(Irreversibility::from_reply("no"), Irreversibility::No);
        assert_eq!(Irreversibility::from_reply("0"), Irreversibility::No);
        assert_eq!(
            Irreversibility::from_reply("somewhat"),
            Irreversibility::Partial
        );
    }
}

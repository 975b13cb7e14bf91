//! Sensor council: one consolidated model call scores all four
//! dimensions of a decision brief.
//!
//! Replies degrade per dimension: a sensor the model failed to produce
//! becomes a worst-case report (score 0, hard fail) so outages block
//! rather than approve. The full report is still range-validated by the
//! core before the gate runs.

use authority_core::{CouncilReport, Dimension, SensorReport};

use crate::prompts::COUNCIL_PROMPT;
use crate::providers::{ChatMessage, CompletionConfig};
use crate::repair;

use super::{DecisionBrief, Stage, StageContext, StageError};

/// The sensor council stage.
pub struct SensorCouncil {
    ctx: StageContext,
    completion: CompletionConfig,
}

impl SensorCouncil {
    pub(crate) fn new(ctx: StageContext, completion: CompletionConfig) -> Self {
        Self { ctx, completion }
    }

    /// Run all four sensors in a single call.
    pub async fn analyze(&self, brief: &DecisionBrief) -> Result<CouncilReport, StageError> {
        let messages = vec![
            ChatMessage::system(COUNCIL_PROMPT),
            ChatMessage::user(Self::render_brief(brief)),
        ];

        let response = self
            .ctx
            .complete(Stage::Council, messages, &self.completion)
            .await?;

        let report = match repair::parse_lenient(&response.content) {
            Ok(value) => Self::parse_reply(&value),
            Err(e) => {
                tracing::warn!(error = %e, "council reply unrecoverable, degrading to worst case");
                Self::fallback_report("Sensor analysis failed. Please try again.")
            }
        };

        Ok(report)
    }

    fn render_brief(brief: &DecisionBrief) -> String {
        format!(
            "DECISION:\nGoal: {}\nCost: {}\nRisk: {}\nIrreversible: {:?}",
            brief.goal, brief.cost, brief.risk, brief.irreversible
        )
    }

    /// Build a report from the model's JSON, degrading missing
    /// dimensions to worst case.
    fn parse_reply(value: &serde_json::Value) -> CouncilReport {
        CouncilReport {
            reality: Self::parse_sensor(value, Dimension::Reality),
            risk: Self::parse_sensor(value, Dimension::Risk),
            logic: Self::parse_sensor(value, Dimension::Logic),
            opportunity: Self::parse_sensor(value, Dimension::Opportunity),
        }
    }

    fn parse_sensor(value: &serde_json::Value, dimension: Dimension) -> SensorReport {
        let entry = &value[dimension.as_str()];

        let score = match entry["score"].as_f64() {
            Some(score) if score.is_finite() => score.clamp(0.0, 100.0),
            _ => {
                tracing::warn!(dimension = %dimension, "sensor produced no usable score");
                return SensorReport::hard_fail(format!(
                    "The {} sensor produced no judgment.",
                    dimension
                ));
            }
        };

        let justification = entry["justification"]
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("No justification provided.")
            .to_string();

        SensorReport {
            score,
            justification,
            hard_fail: entry["hard_fail"].as_bool().unwrap_or(false),
        }
    }

    /// Full worst-case report used when the reply is unrecoverable.
    fn fallback_report(message: &str) -> CouncilReport {
        CouncilReport {
            reality: SensorReport::hard_fail(message),
            risk: SensorReport::hard_fail(message),
            logic: SensorReport::hard_fail(message),
            opportunity: SensorReport::hard_fail(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_reply() -> serde_json::Value {
        serde_json::json!({
            "reality": { "score": 88, "justification": "The limiting factor is startup capital.", "hard_fail": false },
            "risk": { "score": 75, "justification": "The real danger is cash-flow gaps.", "hard_fail": false },
            "logic": { "score": 70, "justification": "Compared to renting, this compounds.", "hard_fail": false },
            "opportunity": { "score": 65, "justification": "If successful, within 2 years you could gain a stable income.", "hard_fail": false }
        })
    }

    #[test]
    fn test_parse_full_reply() {
        let report = SensorCouncil::parse_reply(&full_reply());
        assert_eq!(report.reality.score, 88.0);
        assert!(!report.risk.hard_fail);
        assert!(report.logic.justification.contains("compounds"));
        report.validate().unwrap();
    }

    #[test]
    fn test_missing_dimension_degrades_to_hard_fail() {
        let mut value = full_reply();
        value.as_object_mut().unwrap().remove("risk");

        let report = SensorCouncil::parse_reply(&value);
        assert!(report.risk.hard_fail);
        assert_eq!(report.risk.score, 0.0);
        assert!(report.risk.justification.contains("risk sensor"));
        assert!(!report.reality.hard_fail);
    }

    #[test]
    fn test_out_of_range_score_clamped() {
        let mut value = full_reply();
        value["logic"]["score"] = serde_json::json!(140);

        let report = SensorCouncil::parse_reply(&value);
        assert_eq!(report.logic.score, 100.0);
        report.validate().unwrap();
    }

    #[test]
    fn test_hard_fail_flag_carried_through() {
        let mut value = full_reply();
        value["reality"]["hard_fail"] = serde_json::json!(true);

        let report = SensorCouncil::parse_reply(&value);
        assert!(report.reality.hard_fail);
    }

    #[test]
    fn test_empty_justification_replaced() {
        let mut value = full_reply();
        value["opportunity"]["justification"] = serde_json::json!("   ");

        let report = SensorCouncil::parse_reply(&value);
        assert_eq!(report.opportunity.justification, "No justification provided.");
    }

    #[test]
    fn test_fallback_report_blocks() {
        let report = SensorCouncil::fallback_report("model outage");
        let card = authority_core::decide(&report).unwrap();
        assert!(card.verdict.is_blocked());
    }
}

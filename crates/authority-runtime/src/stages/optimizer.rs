//! Strategic optimizer: measurable improvement suggestions for
//! non-approved decisions.
//!
//! Invoked by the pipeline only when the verdict is CAUTION or BLOCKED.
//! Failures degrade to fixed fallback suggestions.

use authority_core::{CouncilReport, DecisionCard, Verdict};

use crate::prompts::OPTIMIZER_PROMPT;
use crate::providers::{ChatMessage, CompletionConfig};
use crate::repair;

use super::{DecisionBrief, Stage, StageContext};

const MAX_SUGGESTIONS: usize = 3;

/// The strategic optimizer stage.
pub struct StrategicOptimizer {
    ctx: StageContext,
    completion: CompletionConfig,
}

impl StrategicOptimizer {
    pub(crate) fn new(ctx: StageContext, completion: CompletionConfig) -> Self {
        Self { ctx, completion }
    }

    /// Generate up to three measurable suggestions. Infallible: failures
    /// degrade to fixed fallbacks. Approved decisions get none.
    pub async fn optimize(
        &self,
        brief: &DecisionBrief,
        report: &CouncilReport,
        card: &DecisionCard,
    ) -> Vec<String> {
        if card.verdict == Verdict::Approved {
            return Vec::new();
        }

        let messages = vec![
            ChatMessage::system(OPTIMIZER_PROMPT),
            ChatMessage::user(Self::render_context(brief, report, card)),
        ];

        let response = match self
            .ctx
            .complete(Stage::Optimizer, messages, &self.completion)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "optimizer failed, using fallback suggestions");
                return Self::fallback_suggestions();
            }
        };

        match repair::parse_string_array(&response.content) {
            Some(suggestions) => suggestions.into_iter().take(MAX_SUGGESTIONS).collect(),
            None => {
                tracing::warn!("optimizer reply unparseable, using fallback suggestions");
                Self::fallback_suggestions()
            }
        }
    }

    fn render_context(brief: &DecisionBrief, report: &CouncilReport, card: &DecisionCard) -> String {
        format!(
            "VERDICT: {}\n\nDECISION:\n- Goal: {}\n- Cost: {}\n- Risk: {}\n- Irreversible: {:?}\n\n\
             ANALYSIS RESULTS:\n- Reality: {} (score {})\n- Risk: {} (score {})\n\
             - Logic: {} (score {})\n- Opportunity: {} (score {})\n\nBLOCKING REASON: {}",
            card.verdict,
            brief.goal,
            brief.cost,
            brief.risk,
            brief.irreversible,
            report.reality.justification,
            report.reality.score,
            report.risk.justification,
            report.risk.score,
            report.logic.justification,
            report.logic.score,
            report.opportunity.justification,
            report.opportunity.score,
            card.blocking_reason
                .as_deref()
                .unwrap_or("Decision requires improvement"),
        )
    }

    fn fallback_suggestions() -> Vec<String> {
        vec![
            "Increase your safety margin by at least 30% before committing.".to_string(),
            "Extend your timeline by 3-6 months for proper preparation.".to_string(),
            "Reduce initial commitment to 50% of planned resources.".to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::Irreversibility;
    use authority_core::{DecisionGate, SensorReport};

    fn brief() -> DecisionBrief {
        DecisionBrief {
            goal: "open a bakery".to_string(),
            cost: "life savings".to_string(),
            risk: "shop fails".to_string(),
            irreversible: Irreversibility::Partial,
        }
    }

    fn low_report() -> CouncilReport {
        CouncilReport {
            reality: SensorReport::new(30.0, "The limiting factor is capital."),
            risk: SensorReport::new(25.0, "The real danger is cash flow."),
            logic: SensorReport::new(40.0, "Compared to saving, this depreciates."),
            opportunity: SensorReport::new(50.0, "Upside is independence."),
        }
    }

    #[test]
    fn test_render_context_includes_verdict_and_reason() {
        let report = low_report();
        let card = DecisionGate::new().decide(&report);
        assert!(card.verdict.is_blocked());

        let rendered = StrategicOptimizer::render_context(&brief(), &report, &card);
        assert!(rendered.contains("VERDICT: BLOCKED"));
        assert!(rendered.contains("The real danger is cash flow."));
        assert!(rendered.contains("open a bakery"));
    }

    #[test]
    fn test_fallback_suggestions_are_measurable() {
        let suggestions = StrategicOptimizer::fallback_suggestions();
        assert_eq!(suggestions.len(), 3);
        for s in &suggestions {
            assert!(s.chars().any(|c| c.is_ascii_digit()), "not measurable: {}", s);
        }
    }
}

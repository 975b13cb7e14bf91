//! The Decision Gate: deterministic verdict synthesis.
//!
//! The gate applies strict, non-configurable policy rules:
//! 1. Any hard-failing sensor → BLOCKED, citing the highest-priority failure
//! 2. Weighted overall below [`BLOCK_THRESHOLD`] → BLOCKED, citing the
//!    lowest-scoring sensor
//! 3. Overall below [`CAUTION_THRESHOLD`] → CAUTION
//! 4. Otherwise → APPROVED
//!
//! Weights and thresholds are compile-time constants, not a tuning toy.
//! The gate never calls out to any external service.

use crate::types::{CouncilReport, DecisionCard, Dimension, ScoreSet, SensorReport, Verdict};

/// Weight applied to the reality (constraint) score.
pub const REALITY_WEIGHT: f64 = 0.35;

/// Weight applied to the risk score.
pub const RISK_WEIGHT: f64 = 0.30;

/// Weight applied to the logic (value-versus-cost) score.
pub const LOGIC_WEIGHT: f64 = 0.20;

/// Weight applied to the opportunity score.
pub const OPPORTUNITY_WEIGHT: f64 = 0.15;

/// Overall scores strictly below this are blocked outright.
pub const BLOCK_THRESHOLD: f64 = 40.0;

/// Overall scores strictly below this, but at or above
/// [`BLOCK_THRESHOLD`], warrant caution.
pub const CAUTION_THRESHOLD: f64 = 70.0;

/// The Decision Gate converts a validated council report into a verdict.
pub struct DecisionGate;

impl DecisionGate {
    pub fn new() -> Self {
        Self
    }

    /// Decide a verdict for a validated council report.
    ///
    /// Total on valid input: never fails, performs no I/O, and the same
    /// report always produces the same card.
    pub fn decide(&self, report: &CouncilReport) -> DecisionCard {
        let scores = Self::score(report);

        // Rule 1: hard fails dominate numeric aggregation.
        if let Some((dimension, sensor)) = self.find_hard_fail(report) {
            tracing::debug!(dimension = %dimension, "hard fail forces block");
            return DecisionCard {
                verdict: Verdict::Blocked,
                scores,
                blocking_reason: Some(sensor.justification.clone()),
            };
        }

        let verdict = Self::classify(scores.overall);
        let blocking_reason = if verdict.is_blocked() {
            let (dimension, sensor) = self.lowest_scoring(report);
            tracing::debug!(
                dimension = %dimension,
                overall = scores.overall,
                "overall below block threshold"
            );
            Some(sensor.justification.clone())
        } else {
            None
        };

        DecisionCard {
            verdict,
            scores,
            blocking_reason,
        }
    }

    /// Classify an overall score into a verdict band.
    ///
    /// Boundary inclusivity is fixed: exactly [`BLOCK_THRESHOLD`] is
    /// CAUTION, exactly [`CAUTION_THRESHOLD`] is APPROVED.
    pub fn classify(overall: f64) -> Verdict {
        if overall < BLOCK_THRESHOLD {
            Verdict::Blocked
        } else if overall < CAUTION_THRESHOLD {
            Verdict::Caution
        } else {
            Verdict::Approved
        }
    }

    /// Compute the derived score set for a report.
    fn score(report: &CouncilReport) -> ScoreSet {
        let overall = report.reality.score * REALITY_WEIGHT
            + report.risk.score * RISK_WEIGHT
            + report.logic.score * LOGIC_WEIGHT
            + report.opportunity.score * OPPORTUNITY_WEIGHT;

        ScoreSet {
            reality: report.reality.score,
            risk: report.risk.score,
            logic: report.logic.score,
            opportunity: report.opportunity.score,
            overall,
        }
    }

    /// Find the first hard-failing sensor in priority order.
    fn find_hard_fail<'a>(
        &self,
        report: &'a CouncilReport,
    ) -> Option<(Dimension, &'a SensorReport)> {
        report.iter().find(|(_, sensor)| sensor.hard_fail)
    }

    /// Find the lowest-scoring sensor. Ties keep the earliest dimension
    /// in priority order.
    fn lowest_scoring<'a>(&self, report: &'a CouncilReport) -> (Dimension, &'a SensorReport) {
        let mut lowest = (Dimension::Reality, &report.reality);
        for (dimension, sensor) in report.iter() {
            if sensor.score < lowest.1.score {
                lowest = (dimension, sensor);
            }
        }
        lowest
    }
}

impl Default for DecisionGate {
    fn default() -> Self {
        Self::new()
    }
}

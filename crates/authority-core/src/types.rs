//! Core types for decision evaluation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named scoring dimension supplied as input to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Hard constraints: money, time, skills, physics.
    Reality,

    /// Hidden dangers and failure modes. Pre-inverted by the sensor:
    /// a higher score means lower danger.
    Risk,

    /// Value versus cost. Does this compound or depreciate?
    Logic,

    /// Upside potential if the decision succeeds.
    Opportunity,
}

impl Dimension {
    /// All dimensions in blocking priority order.
    ///
    /// When multiple sensors hard-fail, physical/financial impossibility
    /// and catastrophic risk outrank logic or opportunity concerns.
    pub const PRIORITY: [Dimension; 4] = [
        Dimension::Reality,
        Dimension::Risk,
        Dimension::Logic,
        Dimension::Opportunity,
    ];

    /// Lowercase wire name for this dimension.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Reality => "reality",
            Dimension::Risk => "risk",
            Dimension::Logic => "logic",
            Dimension::Opportunity => "opportunity",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final decision verdict. Exactly one holds for any valid input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Approved,
    Caution,
    Blocked,
}

impl Verdict {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Verdict::Blocked)
    }

    /// Ordering for monotonicity checks: higher is better.
    pub fn rank(&self) -> u8 {
        match self {
            Verdict::Blocked => 0,
            Verdict::Caution => 1,
            Verdict::Approved => 2,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Approved => "APPROVED",
            Verdict::Caution => "CAUTION",
            Verdict::Blocked => "BLOCKED",
        };
        f.write_str(s)
    }
}

/// One sensor's judgment of a single dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReport {
    /// Score in [0, 100], higher is better for this dimension's intent.
    pub score: f64,

    /// One-sentence justification. Carried through to the decision card
    /// when this sensor blocks; never interpreted by the gate.
    pub justification: String,

    /// Forces a block regardless of numeric aggregation.
    #[serde(default)]
    pub hard_fail: bool,
}

impl SensorReport {
    /// A passing report with the given score.
    pub fn new(score: f64, justification: impl Into<String>) -> Self {
        Self {
            score,
            justification: justification.into(),
            hard_fail: false,
        }
    }

    /// A worst-case report: zero score and a forced block.
    ///
    /// Used when a sensor could not produce a judgment, so outages
    /// block rather than approve.
    pub fn hard_fail(justification: impl Into<String>) -> Self {
        Self {
            score: 0.0,
            justification: justification.into(),
            hard_fail: true,
        }
    }
}

/// Combined output of the four sensors: exactly one report per dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouncilReport {
    pub reality: SensorReport,
    pub risk: SensorReport,
    pub logic: SensorReport,
    pub opportunity: SensorReport,
}

impl CouncilReport {
    /// The report for a dimension.
    pub fn get(&self, dimension: Dimension) -> &SensorReport {
        match dimension {
            Dimension::Reality => &self.reality,
            Dimension::Risk => &self.risk,
            Dimension::Logic => &self.logic,
            Dimension::Opportunity => &self.opportunity,
        }
    }

    /// Iterate reports in blocking priority order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, &SensorReport)> {
        Dimension::PRIORITY.iter().map(move |d| (*d, self.get(*d)))
    }
}

/// The four sub-scores plus the derived overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSet {
    pub reality: f64,
    pub risk: f64,
    pub logic: f64,
    pub opportunity: f64,
    pub overall: f64,
}

/// Immutable output record of the gate.
///
/// Created once per request and returned to the caller; the gate holds no
/// state across requests. Carries no timestamp so that identical inputs
/// serialize byte-identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionCard {
    /// Exactly one of APPROVED, CAUTION, BLOCKED.
    pub verdict: Verdict,

    /// Input sub-scores plus derived overall.
    pub scores: ScoreSet,

    /// Present only when the verdict is BLOCKED.
    pub blocking_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_wire_names() {
        assert_eq!(serde_json::to_string(&Verdict::Approved).unwrap(), "\"APPROVED\"");
        assert_eq!(serde_json::to_string(&Verdict::Caution).unwrap(), "\"CAUTION\"");
        assert_eq!(serde_json::to_string(&Verdict::Blocked).unwrap(), "\"BLOCKED\"");
    }

    #[test]
    fn test_dimension_wire_names() {
        assert_eq!(serde_json::to_string(&Dimension::Reality).unwrap(), "\"reality\"");
        assert_eq!(Dimension::Opportunity.to_string(), "opportunity");
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(Dimension::PRIORITY[0], Dimension::Reality);
        assert_eq!(Dimension::PRIORITY[1], Dimension::Risk);
        assert_eq!(Dimension::PRIORITY[2], Dimension::Logic);
        assert_eq!(Dimension::PRIORITY[3], Dimension::Opportunity);
    }

    #[test]
    fn test_hard_fail_defaults_false_on_wire() {
        let report: SensorReport =
            serde_json::from_str(r#"{"score": 50, "justification": "ok"}"#).unwrap();
        assert!(!report.hard_fail);
    }

    #[test]
    fn test_card_serializes_null_reason() {
        let card = DecisionCard {
            verdict: Verdict::Approved,
            scores: ScoreSet {
                reality: 90.0,
                risk: 85.0,
                logic: 80.0,
                opportunity: 70.0,
                overall: 83.5,
            },
            blocking_reason: None,
        };
        let json = serde_json::to_value(&card).unwrap();
        assert!(json["blocking_reason"].is_null());
        assert_eq!(json["verdict"], "APPROVED");
    }
}

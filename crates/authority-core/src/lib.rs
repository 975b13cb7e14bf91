//! # authority-core
//!
//! Deterministic decision gate for sensor-scored decisions.
//!
//! This crate provides the core decision logic for Authority, answering:
//! - Should this decision proceed?
//! - Does it warrant caution?
//! - What blocks it?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same output
//! 2. **No LLM calls**: The verdict is a pure function of the report
//! 3. **Traceable**: Every BLOCKED cites a sensor justification
//! 4. **Total**: Never fails on validated input
//!
//! ## Example
//!
//! ```rust,ignore
//! use authority_core::{decide, CouncilReport, Verdict};
//!
//! let report = CouncilReport::from_json(council_json)?;
//! let card = decide(&report)?;
//!
//! match card.verdict {
//!     Verdict::Approved => println!("overall {}", card.scores.overall),
//!     Verdict::Caution => println!("proceed with care"),
//!     Verdict::Blocked => println!("BLOCKED: {}", card.blocking_reason.unwrap()),
//! }
//! ```

pub mod gate;
pub mod report;
pub mod types;

// Re-export main types at crate root
pub use gate::{
    DecisionGate, BLOCK_THRESHOLD, CAUTION_THRESHOLD, LOGIC_WEIGHT, OPPORTUNITY_WEIGHT,
    REALITY_WEIGHT, RISK_WEIGHT,
};
pub use report::ReportError;
pub use types::{CouncilReport, DecisionCard, Dimension, ScoreSet, SensorReport, Verdict};

/// Validate a council report and run it through the gate.
///
/// This is the main entry point for Authority evaluation. Validation
/// failures (out-of-range or non-finite scores) are surfaced as a
/// structured [`ReportError`]; on valid input the gate itself cannot fail.
pub fn decide(report: &CouncilReport) -> Result<DecisionCard, ReportError> {
    report.validate()?;
    Ok(DecisionGate::new().decide(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> CouncilReport {
        CouncilReport {
            reality: SensorReport::new(90.0, "capital is sufficient"),
            risk: SensorReport::new(85.0, "loss is recoverable"),
            logic: SensorReport::new(80.0, "value compounds"),
            opportunity: SensorReport::new(70.0, "meaningful upside"),
        }
    }

    #[test]
    fn test_decide_validates_then_gates() {
        let card = decide(&report()).unwrap();
        assert_eq!(card.verdict, Verdict::Approved);
        assert!(card.blocking_reason.is_none());
    }

    #[test]
    fn test_decide_rejects_out_of_range() {
        let mut r = report();
        r.reality.score = 250.0;
        assert!(matches!(
            decide(&r),
            Err(ReportError::ScoreOutOfRange { .. })
        ));
    }

    #[test]
    fn test_decide_is_deterministic() {
        let r = report();
        let first = serde_json::to_string(&decide(&r).unwrap()).unwrap();
        let second = serde_json::to_string(&decide(&r).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}

//! Council report parsing and range validation.
//!
//! Parsing is two layers: JSON Schema for wire shape, then in-code range
//! and finiteness checks so a directly-constructed report gets the same
//! guarantees as one off the wire.

use thiserror::Error;

use crate::types::{CouncilReport, Dimension};

use super::schema::validate_report_schema;

/// Structured input errors raised before the gate runs.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Invalid report JSON: {0}")]
    Json(String),

    #[error("Report failed schema validation: {}", .0.join("; "))]
    Schema(Vec<String>),

    #[error("{dimension} score {score} is outside [0, 100]")]
    ScoreOutOfRange { dimension: Dimension, score: f64 },

    #[error("{dimension} score is not a finite number")]
    NonFiniteScore { dimension: Dimension },
}

impl CouncilReport {
    /// Parse and validate a council report from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| ReportError::Json(e.to_string()))?;
        Self::from_value(value)
    }

    /// Validate a JSON value against the schema and convert it.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ReportError> {
        validate_report_schema(&value).map_err(ReportError::Schema)?;

        let report: CouncilReport =
            serde_json::from_value(value).map_err(|e| ReportError::Json(e.to_string()))?;

        report.validate()?;
        Ok(report)
    }

    /// Range and finiteness checks, independent of the wire schema.
    pub fn validate(&self) -> Result<(), ReportError> {
        for (dimension, sensor) in self.iter() {
            if !sensor.score.is_finite() {
                return Err(ReportError::NonFiniteScore { dimension });
            }
            if !(0.0..=100.0).contains(&sensor.score) {
                return Err(ReportError::ScoreOutOfRange {
                    dimension,
                    score: sensor.score,
                });
            }
        }
        Ok(())
    }
}

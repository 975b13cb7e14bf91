//! JSON Schema validation for council reports.
//!
//! Council reports arrive from an external collaborator and are validated
//! against schema/council.schema.json before the gate ever sees them.
//! The gate must never trust unvalidated externally-sourced numbers.

use std::sync::OnceLock;
use thiserror::Error;

/// Embedded council report schema (loaded at compile time).
const COUNCIL_SCHEMA_JSON: &str = include_str!("../../schema/council.schema.json");

/// Compiled JSON Schema validator (initialized once, reused).
static COMPILED_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

/// Errors from schema validation.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to load schema: {0}")]
    LoadError(String),
}

/// Get or initialize the compiled schema validator.
fn get_validator() -> Result<&'static jsonschema::Validator, SchemaError> {
    let result = COMPILED_SCHEMA.get_or_init(|| {
        let schema_value: serde_json::Value = match serde_json::from_str(COUNCIL_SCHEMA_JSON) {
            Ok(v) => v,
            Err(e) => return Err(format!("Invalid schema JSON: {}", e)),
        };

        match jsonschema::options().build(&schema_value) {
            Ok(v) => Ok(v),
            Err(e) => Err(format!("Failed to compile schema: {}", e)),
        }
    });

    match result {
        Ok(v) => Ok(v),
        Err(e) => Err(SchemaError::LoadError(e.clone())),
    }
}

/// Validate a council report JSON value against the schema.
///
/// # Returns
///
/// * `Ok(())` - Report shape is valid
/// * `Err(Vec<String>)` - List of validation errors
pub fn validate_report_schema(report_json: &serde_json::Value) -> Result<(), Vec<String>> {
    let validator = get_validator().map_err(|e| vec![e.to_string()])?;

    let errors: Vec<String> = validator
        .iter_errors(report_json)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor(score: f64) -> serde_json::Value {
        serde_json::json!({
            "score": score,
            "justification": "one sentence",
            "hard_fail": false
        })
    }

    #[test]
    fn test_valid_report_passes_schema() {
        let value = serde_json::json!({
            "reality": sensor(90.0),
            "risk": sensor(85.0),
            "logic": sensor(80.0),
            "opportunity": sensor(70.0)
        });
        assert!(validate_report_schema(&value).is_ok());
    }

    #[test]
    fn test_missing_dimension_fails() {
        let value = serde_json::json!({
            "reality": sensor(90.0),
            "risk": sensor(85.0),
            "logic": sensor(80.0)
            // Missing: opportunity
        });
        let result = validate_report_schema(&value);
        assert!(result.is_err());
        assert!(!result.unwrap_err().is_empty());
    }

    #[test]
    fn test_out_of_range_score_fails() {
        let value = serde_json::json!({
            "reality": sensor(101.0),
            "risk": sensor(85.0),
            "logic": sensor(80.0),
            "opportunity": sensor(70.0)
        });
        assert!(validate_report_schema(&value).is_err());
    }

    #[test]
    fn test_non_boolean_hard_fail_fails() {
        let value = serde_json::json!({
            "reality": {
                "score": 50.0,
                "justification": "ok",
                "hard_fail": "yes"
            },
            "risk": sensor(85.0),
            "logic": sensor(80.0),
            "opportunity": sensor(70.0)
        });
        assert!(validate_report_schema(&value).is_err());
    }

    #[test]
    fn test_additional_properties_fail() {
        let value = serde_json::json!({
            "reality": sensor(90.0),
            "risk": sensor(85.0),
            "logic": sensor(80.0),
            "opportunity": sensor(70.0),
            "unknown_field": "should fail"
        });
        assert!(validate_report_schema(&value).is_err());
    }
}

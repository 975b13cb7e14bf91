//! Council report parsing and validation.
//!
//! Reports are structured data from the sensor collaborator, validated
//! against a JSON Schema and re-checked in code before the gate runs.

mod parser;
mod schema;

pub use parser::ReportError;
pub use schema::validate_report_schema;

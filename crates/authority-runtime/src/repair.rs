//! Lenient JSON recovery for model replies.
//!
//! Generative models wrap JSON in markdown fences, emit Python-style
//! literals, leave trailing commas, or truncate mid-object. Parsing runs
//! through escalating recovery steps; if none produce valid JSON the reply
//! is rejected and the stage decides how to degrade.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref FENCE_RE: Regex = Regex::new(r"```(?:json)?").unwrap();
    static ref LINE_COMMENT_RE: Regex = Regex::new(r"(?m)//.*$").unwrap();
    static ref TRAILING_OBJ_COMMA_RE: Regex = Regex::new(r",\s*\}").unwrap();
    static ref TRAILING_ARR_COMMA_RE: Regex = Regex::new(r",\s*\]").unwrap();
}

/// The reply could not be recovered into JSON.
#[derive(Error, Debug)]
#[error("Could not recover JSON from model reply: {snippet}")]
pub struct RepairError {
    /// Leading fragment of the unparseable reply, for logging.
    pub snippet: String,
}

impl RepairError {
    fn new(text: &str) -> Self {
        let snippet: String = text.chars().take(120).collect();
        Self { snippet }
    }
}

/// Parse a model reply into JSON, applying escalating recovery steps.
pub fn parse_lenient(text: &str) -> Result<serde_json::Value, RepairError> {
    let text = strip_code_fences(text);

    // Step 1: the reply is already valid JSON
    if let Ok(value) = serde_json::from_str(&text) {
        return Ok(value);
    }

    // Step 2: aggressive cleanup - literals, comments, trailing commas,
    // surrounding prose
    let cleaned = strip_trailing_commas(&strip_line_comments(&normalize_literals(&text)));
    let candidate = extract_object(&cleaned).unwrap_or(cleaned.as_str());
    if let Ok(value) = serde_json::from_str(candidate) {
        return Ok(value);
    }

    // Step 3: close truncated structures
    if let Some(repaired) = repair_truncated(&cleaned) {
        if let Ok(value) = serde_json::from_str(&repaired) {
            return Ok(value);
        }
    }

    Err(RepairError::new(&text))
}

/// Parse a reply expected to be a JSON array of strings.
///
/// Falls back to extracting the first bracketed region when the array is
/// embedded in prose.
pub fn parse_string_array(text: &str) -> Option<Vec<String>> {
    let as_strings = |value: serde_json::Value| -> Option<Vec<String>> {
        let items = value.as_array()?;
        let strings: Vec<String> = items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();
        if strings.is_empty() {
            None
        } else {
            Some(strings)
        }
    };

    let text = strip_code_fences(text);

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) {
        if let Some(strings) = as_strings(value) {
            return Some(strings);
        }
    }

    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if start >= end {
        return None;
    }
    let candidate = strip_trailing_commas(&text[start..=end]);
    serde_json::from_str::<serde_json::Value>(&candidate)
        .ok()
        .and_then(as_strings)
}

/// Remove markdown code fences around a reply.
fn strip_code_fences(text: &str) -> String {
    if text.contains("```") {
        FENCE_RE.replace_all(text, "").trim().to_string()
    } else {
        text.trim().to_string()
    }
}

/// Rewrite Python-style literals into JSON ones.
fn normalize_literals(text: &str) -> String {
    text.replace("True", "true")
        .replace("False", "false")
        .replace("None", "null")
}

/// Drop `// ...` line comments some models add to JSON.
fn strip_line_comments(text: &str) -> String {
    LINE_COMMENT_RE.replace_all(text, "").to_string()
}

/// Remove trailing commas before closing braces and brackets.
fn strip_trailing_commas(text: &str) -> String {
    let text = TRAILING_OBJ_COMMA_RE.replace_all(text, "}");
    TRAILING_ARR_COMMA_RE.replace_all(&text, "]").to_string()
}

/// Extract the outermost object from surrounding prose.
fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start < end {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Close open strings, brackets, and braces in a truncated reply.
fn repair_truncated(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let text = &text[start..];

    let open_braces =
        text.matches('{').count() as i64 - text.matches('}').count() as i64;
    let open_brackets =
        text.matches('[').count() as i64 - text.matches(']').count() as i64;

    // Odd number of unescaped quotes means an unclosed string
    let mut in_string = false;
    let mut last_char = '\0';
    for c in text.chars() {
        if c == '"' && last_char != '\\' {
            in_string = !in_string;
        }
        last_char = c;
    }

    let mut repaired = text.to_string();
    if in_string {
        repaired.push('"');
    }
    for _ in 0..open_brackets.max(0) {
        repaired.push(']');
    }
    for _ in 0..open_braces.max(0) {
        repaired.push('}');
    }

    Some(repaired)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json_passes_through() {
        let value = parse_lenient(r#"{"score": 42}"#).unwrap();
        assert_eq!(value["score"], 42);
    }

    #[test]
    fn test_markdown_fences_stripped() {
        let reply = "```json\n{\"score\": 42}\n```";
        let value = parse_lenient(reply).unwrap();
        assert_eq!(value["score"], 42);
    }

    #[test]
    fn test_python_literals_normalized() {
        let value = parse_lenient(r#"{"flag": True, "other": None}"#).unwrap();
        assert_eq!(value["flag"], true);
        assert!(value["other"].is_null());
    }

    #[test]
    fn test_trailing_comma_removed() {
        let value = parse_lenient(r#"{"a": 1, "b": [1, 2,],}"#).unwrap();
        assert_eq!(value["b"][1], 2);
    }

    #[test]
    fn test_object_extracted_from_prose() {
        let reply = r#"Here is the analysis you asked for: {"score": 7} hope it helps"#;
        let value = parse_lenient(reply).unwrap();
        assert_eq!(value["score"], 7);
    }

    #[test]
    fn test_truncated_object_repaired() {
        let reply = r#"{"green": {"sentence": "the limit is capi"#;
        let value = parse_lenient(reply).unwrap();
        assert!(value["green"]["sentence"]
            .as_str()
            .unwrap()
            .starts_with("the limit"));
    }

    #[test]
    fn test_line_comments_stripped() {
        let reply = "{\n  \"score\": 9 // looks fine\n}";
        let value = parse_lenient(reply).unwrap();
        assert_eq!(value["score"], 9);
    }

    #[test]
    fn test_unrecoverable_reply_rejected() {
        let err = parse_lenient("I cannot answer that.").unwrap_err();
        assert!(err.snippet.contains("I cannot"));
    }

    #[test]
    fn test_string_array_direct() {
        let suggestions = parse_string_array(r#"["a", "b", "c"]"#).unwrap();
        assert_eq!(suggestions.len(), 3);
    }

    #[test]
    fn test_string_array_embedded_in_prose() {
        let reply = "Suggestions:\n[\"cut spend by 20%\", \"wait 3 months\"]\nGood luck!";
        let suggestions = parse_string_array(reply).unwrap();
        assert_eq!(suggestions[0], "cut spend by 20%");
    }

    #[test]
    fn test_string_array_rejects_non_array() {
        assert!(parse_string_array(r#"{"not": "an array"}"#).is_none());
        assert!(parse_string_array("no brackets at all").is_none());
    }
}

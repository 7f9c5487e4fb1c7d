//! Exam-attempt loader.
//!
//! The platform exports attempts as a JSON array. By contract the attempt
//! to report on is the first element; any further elements are ignored.

use crate::error::ReportError;
use crate::models::RawAttempt;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// Load the attempt stored at `path`.
pub fn load_attempt(path: &Path) -> Result<RawAttempt, ReportError> {
    info!("Loading exam attempt from {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| {
        ReportError::MalformedInput(format!("cannot read {}: {}", path.display(), e))
    })?;

    parse_attempt(&content)
}

/// Parse an attempt from the text of an export file.
pub fn parse_attempt(content: &str) -> Result<RawAttempt, ReportError> {
    let document: Value = serde_json::from_str(content)
        .map_err(|e| ReportError::MalformedInput(format!("input is not valid JSON: {}", e)))?;

    let first = match document {
        Value::Array(mut items) => {
            debug!("Input array holds {} attempt(s)", items.len());
            if items.is_empty() {
                return Err(ReportError::MalformedInput(
                    "input array is empty; expected at least one attempt".to_string(),
                ));
            }
            items.swap_remove(0)
        }
        other => {
            return Err(ReportError::MalformedInput(format!(
                "expected a JSON array of attempts, found {}",
                json_kind(&other)
            )))
        }
    };

    serde_json::from_value(first)
        .map_err(|e| ReportError::MalformedInput(format!("attempt record: {}", e)))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = include_str!("../../fixtures/sample_attempt.json");

    #[test]
    fn test_parse_sample_fixture() {
        let attempt = parse_attempt(SAMPLE).unwrap();
        assert_eq!(attempt.subjects.len(), 3);
        assert_eq!(attempt.sections.len(), 2);
        assert_eq!(attempt.test.total_questions, 6);
    }

    #[test]
    fn test_takes_first_element_only() {
        let mut items: Vec<Value> = serde_json::from_str(SAMPLE).unwrap();
        items.push(serde_json::json!({ "not": "an attempt" }));
        let content = serde_json::to_string(&items).unwrap();

        assert!(parse_attempt(&content).is_ok());
    }

    #[test]
    fn test_rejects_non_array() {
        let err = parse_attempt(r#"{"test": {}}"#).unwrap_err();
        assert!(matches!(err, ReportError::MalformedInput(_)));
        assert!(err.to_string().contains("an object"));
    }

    #[test]
    fn test_rejects_empty_array() {
        let err = parse_attempt("[]").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_missing_required_key() {
        let mut items: Vec<Value> = serde_json::from_str(SAMPLE).unwrap();
        items[0].as_object_mut().unwrap().remove("sections");
        let content = serde_json::to_string(&items).unwrap();

        let err = parse_attempt(&content).unwrap_err();
        assert!(matches!(err, ReportError::MalformedInput(_)));
        assert!(err.to_string().contains("sections"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let attempt = load_attempt(file.path()).unwrap();
        assert_eq!(attempt.total_correct, 3);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_attempt(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }
}

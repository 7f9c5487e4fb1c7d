//! Structured insights returned by the first LLM call.

use crate::feedback::client::FeedbackError;
use serde::{Deserialize, Serialize};

/// Four short lists of observations about the attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insights {
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub time_management: Vec<String>,
    pub recommendations: Vec<String>,
}

impl Insights {
    /// Substitute content used whenever the service cannot help.
    pub fn fallback() -> Self {
        Self {
            strengths: vec!["Unable to analyze strengths at this time".to_string()],
            improvements: vec!["Unable to analyze areas for improvement at this time".to_string()],
            time_management: vec!["Unable to analyze time management at this time".to_string()],
            recommendations: vec!["Please review the raw performance data for insights".to_string()],
        }
    }

    /// The four groups with their report headings, in report order.
    pub fn groups(&self) -> [(&'static str, &[String]); 4] {
        [
            ("Key Strengths", self.strengths.as_slice()),
            ("Areas for Improvement", self.improvements.as_slice()),
            ("Time Management Analysis", self.time_management.as_slice()),
            ("Recommendations", self.recommendations.as_slice()),
        ]
    }
}

/// Remove a surrounding markdown code fence (```json ... ```), if any.
pub fn strip_code_fence(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix("```") {
        body = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            // single-line fence: ```json {...}```
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        };
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }

    body.trim()
}

/// Parse the JSON object the service was asked to produce.
pub fn parse_insights(text: &str) -> Result<Insights, FeedbackError> {
    serde_json::from_str(strip_code_fence(text)).map_err(|e| FeedbackError::Parse(e.to_string()))
}

//! Error taxonomy for a report run.
//!
//! Every variant here is fatal for the run. Failures talking to the LLM
//! service live in [`crate::feedback::client::FeedbackError`] and are recovered
//! inside the feedback module.

use std::path::PathBuf;
use thiserror::Error;

/// A fatal error that aborts report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Required configuration (credential, fonts) is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The input record is missing required keys or holds unusable values.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The output document could not be produced at the destination.
    #[error("failed to render {}: {reason}", destination.display())]
    Render {
        destination: PathBuf,
        reason: String,
    },
}

impl ReportError {
    /// Shorthand for a [`ReportError::Render`] at `destination`.
    pub fn render(destination: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Render {
            destination: destination.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_names_destination() {
        let err = ReportError::render("out/report.pdf", "permission denied");
        let message = err.to_string();
        assert!(message.contains("out/report.pdf"));
        assert!(message.contains("permission denied"));
    }
}

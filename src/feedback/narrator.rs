//! Narrative generation with fallback.
//!
//! The narrator never fails: each LLM exchange that errors or returns
//! unusable content is replaced by fixed text, and the run continues.

use crate::feedback::client::{CompletionClient, FeedbackError};
use crate::feedback::insights::{parse_insights, Insights};
use crate::feedback::prompt::{insights_prompt, report_prompt};
use crate::models::Summary;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{info, warn};

/// Opening line of the narrative when the service could not write one.
pub const FALLBACK_NARRATIVE: &str =
    "Unable to generate feedback at this time. Please try again later.";

/// Drives the two LLM exchanges of a run.
pub struct Narrator<C> {
    client: C,
    show_progress: bool,
}

impl<C: CompletionClient> Narrator<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            show_progress: false,
        }
    }

    /// Show a terminal spinner while waiting for the service.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Ask for structured insights, or return [`Insights::fallback`].
    pub async fn insights(&self, summary: &Summary) -> Insights {
        let prompt = insights_prompt(summary);
        let result = self
            .ask("Analyzing performance data", &prompt)
            .await
            .and_then(|text| parse_insights(&text));

        match result {
            Ok(insights) => {
                info!("Received structured insights");
                insights
            }
            Err(e) => {
                warn!("Insight request failed, using fallback: {}", e);
                Insights::fallback()
            }
        }
    }

    /// Ask for the report narrative, or build one from `insights`.
    pub async fn narrative(&self, summary: &Summary, insights: &Insights) -> String {
        let prompt = report_prompt(summary, insights);
        match self.ask("Writing feedback narrative", &prompt).await {
            Ok(text) => {
                info!("Received narrative ({} chars)", text.len());
                text
            }
            Err(e) => {
                warn!("Narrative request failed, using fallback: {}", e);
                fallback_narrative(insights)
            }
        }
    }

    async fn ask(&self, message: &'static str, prompt: &str) -> Result<String, FeedbackError> {
        let spinner = self.spinner(message);
        let result = self.client.complete(prompt).await;
        spinner.finish_and_clear();

        let text = result?;
        if text.trim().is_empty() {
            return Err(FeedbackError::EmptyResponse);
        }
        Ok(text)
    }

    fn spinner(&self, message: &'static str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }
}

/// Narrative used when the service is unavailable: an apology line
/// followed by every insight group in the report markup.
pub fn fallback_narrative(insights: &Insights) -> String {
    let mut text = String::new();
    text.push_str(FALLBACK_NARRATIVE);
    text.push_str("\n\n");

    for (heading, items) in insights.groups() {
        text.push_str(&format!("**{}**\n", heading));
        for item in items {
            text.push_str(&format!("* {}\n", item));
        }
        text.push('\n');
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Aggregator;
    use crate::input::loader::parse_attempt;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays canned responses in order.
    struct ScriptedClient {
        responses: Mutex<Vec<Result<String, FeedbackError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(mut responses: Vec<Result<String, FeedbackError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, prompt: &str) -> Result<String, FeedbackError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(FeedbackError::EmptyResponse))
        }
    }

    fn summary() -> Summary {
        let raw = parse_attempt(include_str!("../../fixtures/sample_attempt.json")).unwrap();
        Aggregator::default().aggregate(&raw).unwrap()
    }

    #[test]
    fn test_network_failure_falls_back_everywhere() {
        let client = ScriptedClient::new(vec![
            Err(FeedbackError::Connect("https://example.invalid".to_string())),
            Err(FeedbackError::Timeout(30)),
        ]);
        let narrator = Narrator::new(client);
        let summary = summary();

        let insights = tokio_test::block_on(narrator.insights(&summary));
        assert_eq!(insights, Insights::fallback());

        let narrative = tokio_test::block_on(narrator.narrative(&summary, &insights));
        assert!(narrative.starts_with(FALLBACK_NARRATIVE));
        for (heading, items) in Insights::fallback().groups() {
            assert!(narrative.contains(&format!("**{}**", heading)));
            assert!(narrative.contains(&items[0]));
        }
    }

    #[test]
    fn test_fallback_narrative_lays_out_as_four_groups() {
        use crate::report::markup::{parse_narrative, Block};

        let parsed = parse_narrative(&fallback_narrative(&Insights::fallback()));
        let headers: Vec<&Block> = parsed
            .blocks
            .iter()
            .filter(|b| matches!(b, Block::Header(_)))
            .collect();
        let bullets = parsed
            .blocks
            .iter()
            .filter(|b| matches!(b, Block::Bullet(_)))
            .count();

        assert_eq!(headers.len(), 4);
        assert_eq!(bullets, 4);
        assert_eq!(parsed.current_section.as_deref(), Some("Recommendations"));
    }

    #[test]
    fn test_fenced_insights_are_used() {
        let client = ScriptedClient::new(vec![Ok("```json\n{\"strengths\": [\"Fast\"], \
             \"improvements\": [], \"time_management\": [], \"recommendations\": []}\n```"
            .to_string())]);
        let narrator = Narrator::new(client);

        let insights = tokio_test::block_on(narrator.insights(&summary()));
        assert_eq!(insights.strengths, vec!["Fast"]);
    }

    #[test]
    fn test_unparsable_insights_fall_back() {
        let client = ScriptedClient::new(vec![Ok("I think the student did well.".to_string())]);
        let narrator = Narrator::new(client);

        let insights = tokio_test::block_on(narrator.insights(&summary()));
        assert_eq!(insights, Insights::fallback());
    }

    #[test]
    fn test_narrative_passes_through_and_sees_insights() {
        let client = ScriptedClient::new(vec![Ok("**Overall**\nGreat effort.".to_string())]);
        let narrator = Narrator::new(client);
        let insights = Insights {
            strengths: vec!["Consistent pacing".to_string()],
            ..Insights::fallback()
        };

        let narrative = tokio_test::block_on(narrator.narrative(&summary(), &insights));
        assert_eq!(narrative, "**Overall**\nGreat effort.");

        let prompts = narrator.client.prompts.lock().unwrap();
        assert!(prompts[0].contains("Consistent pacing"));
    }

    #[test]
    fn test_blank_narrative_falls_back() {
        let client = ScriptedClient::new(vec![Ok("   \n".to_string())]);
        let narrator = Narrator::new(client);

        let narrative =
            tokio_test::block_on(narrator.narrative(&summary(), &Insights::fallback()));
        assert!(narrative.starts_with(FALLBACK_NARRATIVE));
    }
}

//! Attempt aggregation and statistics.
//!
//! This module walks the raw attempt tree and computes the subject-wise,
//! section-wise, difficulty, chapter, topic and timing statistics that
//! feed the prompt, the charts and the summary dump.

use crate::analysis::subjects::SubjectTable;
use crate::analysis::syllabus::parse_syllabus;
use crate::error::ReportError;
use crate::models::{
    percentage, Difficulty, OverallPerformance, Question, QuestionStatus, RawAttempt,
    SectionAnalysis, SectionSummary, SubjectPerformance, Summary, TestInfo,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Which questions count toward chapter and topic breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownPolicy {
    /// Every question, whatever its status.
    #[default]
    AllQuestions,
    /// Only questions with status `answered`.
    AttemptedOnly,
}

impl BreakdownPolicy {
    fn includes(self, question: &Question) -> bool {
        match self {
            BreakdownPolicy::AllQuestions => true,
            BreakdownPolicy::AttemptedOnly => question.status == QuestionStatus::Answered,
        }
    }
}

impl fmt::Display for BreakdownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakdownPolicy::AllQuestions => write!(f, "all questions"),
            BreakdownPolicy::AttemptedOnly => write!(f, "attempted only"),
        }
    }
}

/// Builds a [`Summary`] from a raw attempt.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    subjects: SubjectTable,
    policy: BreakdownPolicy,
}

impl Aggregator {
    pub fn new(subjects: SubjectTable, policy: BreakdownPolicy) -> Self {
        Self { subjects, policy }
    }

    /// Aggregate the whole attempt. Pure: the input is only read.
    pub fn aggregate(&self, raw: &RawAttempt) -> Result<Summary, ReportError> {
        info!(
            "Aggregating {} subject(s) and {} section(s), chapter/topic policy: {}",
            raw.subjects.len(),
            raw.sections.len(),
            self.policy
        );

        let test_info = TestInfo {
            total_time: raw.test.total_time,
            total_questions: raw.test.total_questions,
            total_marks: raw.test.total_marks,
            syllabus: parse_syllabus(&raw.test.syllabus),
        };

        let overall_performance = OverallPerformance {
            total_time_taken: raw.total_time_taken,
            total_marks_scored: raw.total_mark_scored,
            total_attempted: raw.total_attempted,
            total_correct: raw.total_correct,
            accuracy: raw.accuracy,
        };

        let mut subject_wise: Vec<SubjectPerformance> = Vec::with_capacity(raw.subjects.len());
        for subject in &raw.subjects {
            let performance = SubjectPerformance {
                name: self.subjects.resolve(&subject.subject_id.oid).to_string(),
                time_taken: subject.total_time_taken,
                marks_scored: subject.total_mark_scored,
                questions_attempted: subject.total_attempted,
                correct_answers: subject.total_correct,
                accuracy: subject.accuracy,
            };
            upsert(&mut subject_wise, performance, |s| &s.name);
        }

        let mut section_wise: Vec<SectionSummary> = Vec::with_capacity(raw.sections.len());
        for section in &raw.sections {
            let title = section.section_id.title.clone();
            let analysis = analyze_questions(&section.questions, self.policy)
                .map_err(|e| in_section(e, &title))?;
            debug!(
                "Section '{}': {}/{} correct, {} unattempted",
                title, analysis.correct_answers, analysis.total_questions, analysis.unattempted
            );
            upsert(&mut section_wise, SectionSummary { title, analysis }, |s| &s.title);
        }

        Ok(Summary {
            test_info,
            overall_performance,
            subject_wise,
            section_wise,
        })
    }
}

/// Insert `item`, replacing an earlier entry with the same key in place.
fn upsert<T>(items: &mut Vec<T>, item: T, key: impl Fn(&T) -> &String) {
    match items.iter().position(|existing| key(existing) == key(&item)) {
        Some(index) => items[index] = item,
        None => items.push(item),
    }
}

fn in_section(err: ReportError, title: &str) -> ReportError {
    match err {
        ReportError::MalformedInput(msg) => {
            ReportError::MalformedInput(format!("section '{}': {}", title, msg))
        }
        other => other,
    }
}

/// Whether the student's answer to `question` is correct.
///
/// Marked options decide when present; otherwise the numeric input does.
pub fn is_correct(question: &Question) -> bool {
    if !question.marked_options.is_empty() {
        return question.marked_options.iter().any(|o| o.is_correct);
    }
    question
        .input_value
        .as_ref()
        .map_or(false, |input| input.is_correct)
}

/// Question-level analysis of one section.
pub fn analyze_questions(
    questions: &[Question],
    policy: BreakdownPolicy,
) -> Result<SectionAnalysis, ReportError> {
    let mut analysis = SectionAnalysis {
        total_questions: questions.len() as u32,
        ..SectionAnalysis::default()
    };

    for (index, question) in questions.iter().enumerate() {
        let correct = is_correct(question);

        if question.status == QuestionStatus::Answered {
            if correct {
                analysis.correct_answers += 1;
            } else {
                analysis.incorrect_answers += 1;
            }
        } else {
            analysis.unattempted += 1;
        }

        let seconds = question.time_taken.max(0.0);
        analysis.time_analysis.total_time += seconds;
        analysis.time_analysis.time_distribution.record(seconds);

        let level: Difficulty = question.question_id.level.parse().map_err(|e| {
            ReportError::MalformedInput(format!("question {}: {}", index + 1, e))
        })?;
        analysis.difficulty_analysis.get_mut(level).record(correct);

        if policy.includes(question) {
            for chapter in &question.question_id.chapters {
                analysis
                    .chapter_wise
                    .entry(chapter.title.clone())
                    .or_default()
                    .record(correct);
            }
            for topic in &question.question_id.topics {
                analysis
                    .topic_wise
                    .entry(topic.title.clone())
                    .or_default()
                    .record(correct);
            }
        }
    }

    if analysis.total_questions > 0 {
        analysis.time_analysis.avg_time_per_question =
            analysis.time_analysis.total_time / analysis.total_questions as f64;
    }
    analysis.accuracy = percentage(analysis.correct_answers, analysis.total_questions);

    Ok(analysis)
}

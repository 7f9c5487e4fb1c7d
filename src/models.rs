//! Data models for the report pipeline.
//!
//! This module holds both sides of the aggregation pass: the raw
//! exam-attempt records as they appear in the input file, and the
//! derived [`Summary`] that the rest of the application consumes.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Raw input records
// ---------------------------------------------------------------------------

/// One exam attempt, the first element of the input array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttempt {
    /// The test definition this attempt was made against.
    pub test: TestRecord,
    /// Time spent on the whole test, in seconds.
    pub total_time_taken: f64,
    pub total_mark_scored: f64,
    pub total_attempted: u32,
    pub total_correct: u32,
    /// Overall accuracy as reported by the exam platform (percent).
    pub accuracy: f64,
    pub subjects: Vec<SubjectRecord>,
    pub sections: Vec<SectionRecord>,
}

/// Static information about the test.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    /// Allotted duration in minutes.
    pub total_time: f64,
    pub total_questions: u32,
    pub total_marks: f64,
    /// Syllabus as an HTML fragment.
    pub syllabus: String,
}

/// Platform-computed per-subject totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRecord {
    pub subject_id: ObjectId,
    pub total_time_taken: f64,
    pub total_mark_scored: f64,
    pub total_attempted: u32,
    pub total_correct: u32,
    pub accuracy: f64,
}

/// A document-store object identifier (`{"$oid": "..."}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectId {
    #[serde(rename = "$oid")]
    pub oid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRecord {
    pub section_id: SectionRef,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionRef {
    pub title: String,
}

/// Answer status of a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionStatus {
    Answered,
    AnsweredReview,
    MarkedReview,
    NotAnswered,
    /// Any status the platform adds later. Counts as unattempted.
    #[serde(other)]
    Other,
}

/// A single question as answered (or not) by the student.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub status: QuestionStatus,
    /// Seconds spent on the question; absent means 0.
    #[serde(default)]
    pub time_taken: f64,
    #[serde(default)]
    pub marked_options: Vec<MarkedOption>,
    /// Numeric-answer input, for questions without options.
    #[serde(default)]
    pub input_value: Option<InputValue>,
    pub question_id: QuestionMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkedOption {
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputValue {
    #[serde(default)]
    pub is_correct: bool,
}

/// Classification metadata attached to a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionMeta {
    /// Raw difficulty label; validated by the aggregator.
    pub level: String,
    #[serde(default)]
    pub chapters: Vec<Titled>,
    #[serde(default)]
    pub topics: Vec<Titled>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Titled {
    pub title: String,
}

// ---------------------------------------------------------------------------
// Derived summary
// ---------------------------------------------------------------------------

/// Difficulty level of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Tough,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Tough];
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Tough => write!(f, "Tough"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "tough" => Ok(Difficulty::Tough),
            other => Err(format!("unrecognized difficulty level '{}'", other)),
        }
    }
}

/// Time bucket a question falls into, by seconds spent.
///
/// The buckets partition `[0, inf)` at 30 and 60, lower bound inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBucket {
    Quick,
    Moderate,
    Slow,
}

impl TimeBucket {
    pub fn for_seconds(seconds: f64) -> Self {
        if seconds < 30.0 {
            TimeBucket::Quick
        } else if seconds < 60.0 {
            TimeBucket::Moderate
        } else {
            TimeBucket::Slow
        }
    }
}

/// A total/correct counter for one group of questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Tally {
    pub total: u32,
    pub correct: u32,
}

impl Tally {
    pub fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
    }

    /// Percentage of correct answers, or `None` for an empty group.
    pub fn accuracy(&self) -> Option<f64> {
        percentage(self.correct, self.total)
    }
}

// Accuracy is derived, and only emitted when the group is non-empty.
impl Serialize for Tally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let accuracy = self.accuracy();
        let len = if accuracy.is_some() { 3 } else { 2 };
        let mut state = serializer.serialize_struct("Tally", len)?;
        state.serialize_field("total", &self.total)?;
        state.serialize_field("correct", &self.correct)?;
        match accuracy {
            Some(value) => state.serialize_field("accuracy", &value)?,
            None => state.skip_field("accuracy")?,
        }
        state.end()
    }
}

/// `part / whole * 100`, skipped when `whole` is zero.
pub fn percentage(part: u32, whole: u32) -> Option<f64> {
    if whole == 0 {
        None
    } else {
        Some(part as f64 / whole as f64 * 100.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DifficultyBreakdown {
    pub easy: Tally,
    pub medium: Tally,
    pub tough: Tally,
}

impl DifficultyBreakdown {
    pub fn get(&self, level: Difficulty) -> &Tally {
        match level {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Tough => &self.tough,
        }
    }

    pub fn get_mut(&mut self, level: Difficulty) -> &mut Tally {
        match level {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Medium => &mut self.medium,
            Difficulty::Tough => &mut self.tough,
        }
    }

    /// Buckets in easy, medium, tough order.
    pub fn iter(&self) -> impl Iterator<Item = (Difficulty, &Tally)> {
        Difficulty::ALL.into_iter().map(move |level| (level, self.get(level)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeDistribution {
    /// Under 30 seconds.
    pub quick: u32,
    /// 30 to 60 seconds.
    pub moderate: u32,
    /// 60 seconds or more.
    pub slow: u32,
}

impl TimeDistribution {
    pub fn record(&mut self, seconds: f64) {
        match TimeBucket::for_seconds(seconds) {
            TimeBucket::Quick => self.quick += 1,
            TimeBucket::Moderate => self.moderate += 1,
            TimeBucket::Slow => self.slow += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeAnalysis {
    pub total_time: f64,
    /// `total_time / total_questions`, 0 for an empty section.
    pub avg_time_per_question: f64,
    pub time_distribution: TimeDistribution,
}

/// Question-level statistics for one section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionAnalysis {
    pub total_questions: u32,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub unattempted: u32,
    /// Correct over total questions, omitted for an empty section.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub accuracy: Option<f64>,
    pub time_analysis: TimeAnalysis,
    pub difficulty_analysis: DifficultyBreakdown,
    pub chapter_wise: BTreeMap<String, Tally>,
    pub topic_wise: BTreeMap<String, Tally>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestInfo {
    pub total_time: f64,
    pub total_questions: u32,
    pub total_marks: f64,
    /// Subject name to topics, in syllabus order.
    pub syllabus: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallPerformance {
    pub total_time_taken: f64,
    pub total_marks_scored: f64,
    pub total_attempted: u32,
    pub total_correct: u32,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectPerformance {
    pub name: String,
    pub time_taken: f64,
    pub marks_scored: f64,
    pub questions_attempted: u32,
    pub correct_answers: u32,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub title: String,
    pub analysis: SectionAnalysis,
}

/// Everything the aggregator derives from one attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub test_info: TestInfo,
    pub overall_performance: OverallPerformance,
    /// Keyed by subject name, in input order.
    pub subject_wise: Vec<SubjectPerformance>,
    /// Keyed by section title, in input order.
    pub section_wise: Vec<SectionSummary>,
}

#[cfg(test)]
impl Summary {
    pub fn subject(&self, name: &str) -> Option<&SubjectPerformance> {
        self.subject_wise.iter().find(|s| s.name == name)
    }

    pub fn section(&self, title: &str) -> Option<&SectionAnalysis> {
        self.section_wise
            .iter()
            .find(|s| s.title == title)
            .map(|s| &s.analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_bucket_boundaries() {
        assert_eq!(TimeBucket::for_seconds(0.0), TimeBucket::Quick);
        assert_eq!(TimeBucket::for_seconds(29.9), TimeBucket::Quick);
        assert_eq!(TimeBucket::for_seconds(30.0), TimeBucket::Moderate);
        assert_eq!(TimeBucket::for_seconds(59.9), TimeBucket::Moderate);
        assert_eq!(TimeBucket::for_seconds(60.0), TimeBucket::Slow);
        assert_eq!(TimeBucket::for_seconds(3600.0), TimeBucket::Slow);
    }

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!("easy".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert_eq!("tough".parse::<Difficulty>(), Ok(Difficulty::Tough));
        assert!("insane".parse::<Difficulty>().is_err());
        assert!("Easy".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_tally_accuracy_skips_empty() {
        let mut tally = Tally::default();
        assert_eq!(tally.accuracy(), None);

        tally.record(true);
        tally.record(false);
        assert_eq!(tally.accuracy(), Some(50.0));
    }

    #[test]
    fn test_tally_serialization_omits_empty_accuracy() {
        let empty = serde_json::to_value(Tally::default()).unwrap();
        assert!(empty.get("accuracy").is_none());

        let filled = serde_json::to_value(Tally { total: 4, correct: 1 }).unwrap();
        assert_eq!(filled["accuracy"], 25.0);
    }

    #[test]
    fn test_question_defaults() {
        let json = r#"{
            "status": "notAnswered",
            "questionId": { "level": "easy" }
        }"#;
        let question: Question = serde_json::from_str(json).unwrap();
        assert_eq!(question.status, QuestionStatus::NotAnswered);
        assert_eq!(question.time_taken, 0.0);
        assert!(question.marked_options.is_empty());
        assert!(question.input_value.is_none());
        assert!(question.question_id.chapters.is_empty());
    }

    #[test]
    fn test_unknown_status_is_other() {
        let status: QuestionStatus = serde_json::from_str("\"skippedByTimer\"").unwrap();
        assert_eq!(status, QuestionStatus::Other);
    }
}

//! Prompt construction.
//!
//! Two prompts are sent per run: a short one asking for structured
//! insights as JSON, and a long one asking for the report narrative.

use crate::feedback::insights::Insights;
use crate::models::{SectionAnalysis, Summary, Tally};
use std::collections::BTreeMap;

/// Prompt asking for the four insight lists as a JSON object.
pub fn insights_prompt(summary: &Summary) -> String {
    let subject_json = serde_json::to_string_pretty(&summary.subject_wise)
        .unwrap_or_else(|_| "[]".to_string());

    let mut prompt = String::new();
    prompt.push_str(
        "Analyze this student test data and provide insights in a structured format.\n\n",
    );
    prompt.push_str("Test Data Summary:\n");
    prompt.push_str(&format!(
        "- Total Questions: {}\n",
        summary.test_info.total_questions
    ));
    prompt.push_str(&format!("- Total Marks: {}\n", summary.test_info.total_marks));
    prompt.push_str(&format!(
        "- Overall Accuracy: {}%\n\n",
        summary.overall_performance.accuracy
    ));
    prompt.push_str("Subject-wise Performance:\n");
    prompt.push_str(&subject_json);
    prompt.push_str("\n\n");
    prompt.push_str(
        "Please analyze this data and provide:\n\
         1. Overall strengths (list 2-3 key strengths)\n\
         2. Areas for improvement (list 2-3 key areas)\n\
         3. Time management analysis (2-3 points)\n\
         4. Specific recommendations for improvement (3-4 points)\n\n\
         Format your response as a JSON object with these exact keys:\n\
         {\n  \"strengths\": [],\n  \"improvements\": [],\n  \"time_management\": [],\n  \"recommendations\": []\n}\n\n\
         Keep each point concise and specific.",
    );
    prompt
}

/// Prompt asking for the full narrative report.
pub fn report_prompt(summary: &Summary, insights: &Insights) -> String {
    let test = &summary.test_info;
    let overall = &summary.overall_performance;

    let mut prompt = String::new();
    prompt.push_str(
        "Generate a detailed student performance report based on the following test data:\n\n",
    );

    prompt.push_str("TEST OVERVIEW:\n");
    prompt.push_str(&format!("- Total Duration: {} minutes\n", test.total_time));
    prompt.push_str(&format!("- Total Questions: {}\n", test.total_questions));
    prompt.push_str(&format!("- Total Marks: {}\n", test.total_marks));
    if !test.syllabus.is_empty() {
        prompt.push_str("- Syllabus:\n");
        for (subject, topics) in &test.syllabus {
            prompt.push_str(&format!("  - {}: {}\n", subject, topics.join(", ")));
        }
    }
    prompt.push('\n');

    prompt.push_str("OVERALL PERFORMANCE:\n");
    prompt.push_str(&format!(
        "- Total Time Taken: {} seconds\n",
        overall.total_time_taken
    ));
    prompt.push_str(&format!(
        "- Total Marks Scored: {}\n",
        overall.total_marks_scored
    ));
    prompt.push_str(&format!(
        "- Questions Attempted: {}\n",
        overall.total_attempted
    ));
    prompt.push_str(&format!("- Correct Answers: {}\n", overall.total_correct));
    prompt.push_str(&format!("- Overall Accuracy: {}%\n\n", overall.accuracy));

    prompt.push_str("SUBJECT-WISE PERFORMANCE:\n");
    for subject in &summary.subject_wise {
        prompt.push_str(&format!("\n{}:\n", subject.name));
        prompt.push_str(&format!("- Time Taken: {} seconds\n", subject.time_taken));
        prompt.push_str(&format!("- Marks Scored: {}\n", subject.marks_scored));
        prompt.push_str(&format!(
            "- Questions Attempted: {}\n",
            subject.questions_attempted
        ));
        prompt.push_str(&format!("- Correct Answers: {}\n", subject.correct_answers));
        prompt.push_str(&format!("- Accuracy: {}%\n", subject.accuracy));
    }

    prompt.push_str("\nDETAILED SECTION ANALYSIS:\n");
    for section in &summary.section_wise {
        prompt.push_str(&section_block(&section.title, &section.analysis));
    }

    prompt.push_str("\nAI ANALYSIS AND RECOMMENDATIONS:\n");
    for (heading, items) in insights.groups() {
        prompt.push_str(&format!("\n{}:\n", heading));
        for item in items {
            prompt.push_str(&format!("- {}\n", item));
        }
    }

    prompt.push_str(
        "\nBased on this data, generate a comprehensive performance report that:\n\
         1. Provides an overall assessment of the student's performance\n\
         2. Highlights strengths and areas for improvement\n\
         3. Analyzes time management and question selection strategy\n\
         4. Gives specific recommendations for improvement\n\
         5. Maintains an encouraging and positive tone throughout\n\n\
         Format the report with clear sections, bullet points, and bold headers for better readability.\n",
    );

    prompt
}

fn section_block(title: &str, analysis: &SectionAnalysis) -> String {
    let mut block = String::new();

    block.push_str(&format!("\n{}:\n", title));
    block.push_str(&format!("- Total Questions: {}\n", analysis.total_questions));
    block.push_str(&format!("- Correct Answers: {}\n", analysis.correct_answers));
    block.push_str(&format!(
        "- Incorrect Answers: {}\n",
        analysis.incorrect_answers
    ));
    block.push_str(&format!("- Unattempted: {}\n", analysis.unattempted));
    block.push_str(&format!(
        "- Average Time per Question: {:.2} seconds\n",
        analysis.time_analysis.avg_time_per_question
    ));
    let dist = &analysis.time_analysis.time_distribution;
    block.push_str(&format!(
        "- Time Distribution: {} quick (<30s), {} moderate (30-60s), {} slow (60s+)\n",
        dist.quick, dist.moderate, dist.slow
    ));

    block.push_str("\nDifficulty-wise Performance:\n");
    for (level, tally) in analysis.difficulty_analysis.iter() {
        if let Some(line) = tally_line(&level.to_string(), tally) {
            block.push_str(&line);
        }
    }

    block.push_str("\nChapter-wise Performance:\n");
    block.push_str(&tally_lines(&analysis.chapter_wise));

    block.push_str("\nTopic-wise Performance:\n");
    block.push_str(&tally_lines(&analysis.topic_wise));

    block
}

fn tally_lines(groups: &BTreeMap<String, Tally>) -> String {
    groups
        .iter()
        .filter_map(|(name, tally)| tally_line(name, tally))
        .collect()
}

/// `- name: c/t correct (p%)`, or nothing for an empty group.
fn tally_line(name: &str, tally: &Tally) -> Option<String> {
    tally.accuracy().map(|accuracy| {
        format!(
            "- {}: {}/{} correct ({:.1}%)\n",
            name, tally.correct, tally.total, accuracy
        )
    })
}

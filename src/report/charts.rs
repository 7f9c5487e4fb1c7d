//! Bar charts embedded in the report.

use crate::models::Summary;
use anyhow::{Context, Result};
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const SUBJECT_CHART: &str = "subject_performance.png";
pub const SECTION_CHART: &str = "section_performance.png";

// 6in x 4in at 100 dpi.
const CHART_SIZE: (u32, u32) = (600, 400);
const LIGHT_GRAY: RGBColor = RGBColor(211, 211, 211);

/// One bar per subject: name and accuracy percentage.
pub fn subject_accuracy_series(summary: &Summary) -> Vec<(String, f64)> {
    summary
        .subject_wise
        .iter()
        .map(|s| (s.name.clone(), s.accuracy.clamp(0.0, 100.0)))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionBar {
    pub title: String,
    pub total: u32,
    pub correct: u32,
}

pub fn section_series(summary: &Summary) -> Vec<SectionBar> {
    summary
        .section_wise
        .iter()
        .map(|s| SectionBar {
            title: s.title.clone(),
            total: s.analysis.total_questions,
            correct: s.analysis.correct_answers,
        })
        .collect()
}

/// Draw both charts into `dir` and return their paths in report order.
pub fn render_charts(summary: &Summary, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create chart directory: {}", dir.display()))?;

    let subject_path = dir.join(SUBJECT_CHART);
    draw_subject_chart(&subject_accuracy_series(summary), &subject_path)
        .with_context(|| format!("Failed to draw {}", subject_path.display()))?;
    debug!("Wrote {}", subject_path.display());

    let section_path = dir.join(SECTION_CHART);
    draw_section_chart(&section_series(summary), &section_path)
        .with_context(|| format!("Failed to draw {}", section_path.display()))?;
    debug!("Wrote {}", section_path.display());

    info!("Charts saved to {}", dir.display());
    Ok(vec![subject_path, section_path])
}

fn label_for(names: &[String], value: &SegmentValue<i32>) -> String {
    match value {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => names
            .get(*i as usize)
            .cloned()
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    }
}

fn draw_subject_chart(series: &[(String, f64)], path: &Path) -> Result<()> {
    let names: Vec<String> = series.iter().map(|(name, _)| name.clone()).collect();
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Subject-wise Performance", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((0..series.len().max(1) as i32).into_segmented(), 0f64..100f64)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Subject")
        .y_desc("Accuracy (%)")
        .x_label_formatter(&|v| label_for(&names, v))
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BLUE.mix(0.7).filled())
            .margin(12)
            .data(series.iter().enumerate().map(|(i, (_, acc))| (i as i32, *acc))),
    )?;

    chart.draw_series(series.iter().enumerate().map(|(i, (_, acc))| {
        Text::new(
            format!("{:.1}%", acc),
            (SegmentValue::CenterOf(i as i32), (acc + 2.0).min(97.0)),
            ("sans-serif", 12),
        )
    }))?;

    root.present()?;
    Ok(())
}

fn draw_section_chart(series: &[SectionBar], path: &Path) -> Result<()> {
    let names: Vec<String> = series.iter().map(|s| s.title.clone()).collect();
    let y_max = series.iter().map(|s| s.total).max().unwrap_or(0) as f64 + 1.0;

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Section-wise Performance", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((0..series.len().max(1) as i32).into_segmented(), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Section")
        .y_desc("Questions")
        .x_label_formatter(&|v| label_for(&names, v))
        .draw()?;

    // Correct answers are drawn over the totals.
    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(LIGHT_GRAY.filled())
                .margin(12)
                .data(series.iter().enumerate().map(|(i, s)| (i as i32, s.total as f64))),
        )?
        .label("Total Questions")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], LIGHT_GRAY.filled()));

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(GREEN.filled())
                .margin(12)
                .data(series.iter().enumerate().map(|(i, s)| (i as i32, s.correct as f64))),
        )?
        .label("Correct Answers")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], GREEN.filled()));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Aggregator;
    use crate::input::loader::parse_attempt;

    fn summary() -> Summary {
        let raw = parse_attempt(include_str!("../../fixtures/sample_attempt.json")).unwrap();
        Aggregator::default().aggregate(&raw).unwrap()
    }

    #[test]
    fn test_subject_series_follows_input_order() {
        let series = subject_accuracy_series(&summary());
        let names: Vec<&str> = series.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Physics", "Chemistry", "Mathematics"]);
        assert!(series.iter().all(|(_, acc)| (0.0..=100.0).contains(acc)));
    }

    #[test]
    fn test_section_series() {
        let series = section_series(&summary());
        assert_eq!(
            series,
            vec![
                SectionBar {
                    title: "Physics Single Correct".to_string(),
                    total: 3,
                    correct: 1,
                },
                SectionBar {
                    title: "Mathematics Numerical".to_string(),
                    total: 3,
                    correct: 1,
                },
            ]
        );
    }

    #[test]
    fn test_empty_sections_give_empty_series() {
        let mut summary = summary();
        summary.section_wise.clear();
        assert!(section_series(&summary).is_empty());
    }

    #[test]
    fn test_render_charts_writes_small_bitmaps() {
        let dir = tempfile::tempdir().unwrap();
        let paths = render_charts(&summary(), &dir.path().join("charts")).unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with(SUBJECT_CHART));
        assert!(paths[1].ends_with(SECTION_CHART));
        for path in &paths {
            assert_eq!(image::image_dimensions(path).unwrap(), CHART_SIZE);
        }
    }

    #[test]
    fn test_render_charts_without_sections() {
        let mut summary = summary();
        summary.section_wise.clear();
        let dir = tempfile::tempdir().unwrap();

        let paths = render_charts(&summary, dir.path()).unwrap();
        assert!(paths.iter().all(|path| path.is_file()));
    }

    #[test]
    fn test_label_lookup() {
        let names = vec!["Physics".to_string()];
        assert_eq!(label_for(&names, &SegmentValue::CenterOf(0)), "Physics");
        assert_eq!(label_for(&names, &SegmentValue::CenterOf(3)), "");
        assert_eq!(label_for(&names, &SegmentValue::Last), "");
    }
}

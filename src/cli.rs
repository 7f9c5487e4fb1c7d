//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Scorecard - exam performance reports with AI feedback
///
/// Reads an exam-attempt export, computes subject, section, chapter,
/// topic, difficulty and timing statistics, asks an LLM for narrative
/// feedback and lays everything out as a PDF with charts.
///
/// Examples:
///   scorecard --input data/attempt.json
///   scorecard --input data/attempt.json --output reports/alice.pdf
///   scorecard --input data/attempt.json --dry-run --summary-json summary.json
///   scorecard --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Exam-attempt JSON export (an array; the first element is used)
    #[arg(short, long, value_name = "FILE", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Output file path for the PDF report
    ///
    /// Default: from config or output/report.pdf.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Directory for the generated chart images
    #[arg(long, value_name = "DIR")]
    pub chart_dir: Option<PathBuf>,

    /// LLM model used for the feedback narrative
    ///
    /// Can also be set via SCORECARD_MODEL env var or .scorecard.toml config.
    #[arg(short, long, env = "SCORECARD_MODEL")]
    pub model: Option<String>,

    /// Base URL of the generative language API
    #[arg(long, value_name = "URL", env = "SCORECARD_API_URL")]
    pub api_url: Option<String>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Temperature for LLM responses (0.0 - 1.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Count only answered questions in chapter and topic breakdowns
    ///
    /// By default every question contributes, whatever its status.
    #[arg(long)]
    pub attempted_only: bool,

    /// Also write the aggregated statistics as JSON
    #[arg(long, value_name = "FILE")]
    pub summary_json: Option<PathBuf>,

    /// Aggregate and print the statistics without calling the LLM or rendering
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .scorecard.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        match self.input {
            Some(ref input) if !input.is_file() => {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
            None => return Err("An input file is required (--input)".to_string()),
            _ => {}
        }

        if let Some(ref api_url) = self.api_url {
            if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=1.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 1.0".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

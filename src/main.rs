//! Scorecard - exam performance reports with AI feedback
//!
//! A CLI tool that turns an exam-attempt export into a PDF report with
//! subject and section statistics, charts, and narrative feedback from a
//! hosted LLM.
//!
//! Exit codes:
//!   0 - Report written (or dry run completed)
//!   1 - Configuration, input or rendering error

mod analysis;
mod cli;
mod config;
mod error;
mod feedback;
mod input;
mod models;
mod report;

use analysis::Aggregator;
use anyhow::{Context, Result};
use cli::Args;
use config::{Config, CONFIG_FILE_NAME};
use feedback::{GeminiClient, GeminiConfig, Narrator};
use models::Summary;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Scorecard v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_report(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Report failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .scorecard.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    let pdf = config::PdfConfig::default();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the model, subject names, fonts, and more.");
    println!(
        "   Fonts: put the {} TrueType files in ./{}, set {}, or install Liberation Sans or DejaVu Sans.",
        pdf.font_family,
        pdf.font_dir.display(),
        report::fonts::FONT_DIR_ENV
    );
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete report workflow. Returns the exit code.
async fn run_report(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Credential pre-flight, before any processing
    let api_key = if args.dry_run {
        None
    } else {
        match config.api_key() {
            Ok(key) => Some(key),
            Err(e) => {
                error!("{}", e);
                eprintln!("\n❌ {}", e);
                return Ok(1);
            }
        }
    };

    // Step 1: Load and aggregate the attempt
    let input = args
        .input
        .as_deref()
        .context("An input file is required (--input)")?;
    println!("📥 Loading attempt: {}", input.display());
    let raw = input::load_attempt(input)?;

    let aggregator = Aggregator::new(
        config.analysis.subject_table(),
        config.analysis.breakdown_policy,
    );
    let summary = aggregator.aggregate(&raw)?;
    info!(
        "Aggregated {} subjects and {} sections",
        summary.subject_wise.len(),
        summary.section_wise.len()
    );

    if let Some(ref path) = args.summary_json {
        write_summary_json(&summary, path)?;
        println!("   Summary JSON written to: {}", path.display());
    }

    // Handle --dry-run: print statistics and exit
    let Some(api_key) = api_key else {
        print_summary(&summary);
        println!("\n✅ Dry run complete. No LLM calls were made.");
        return Ok(0);
    };

    // Step 2: Narrative feedback
    let client = GeminiClient::new(GeminiConfig {
        api_url: config.model.api_url.clone(),
        model: config.model.name.clone(),
        api_key,
        temperature: config.model.temperature,
        timeout_seconds: config.model.timeout_seconds,
    })?;

    println!("\n🤖 Requesting feedback...");
    println!("   Model: {}", client.model());
    println!("   Timeout: {}s", config.model.timeout_seconds);
    let narrator = Narrator::new(client).with_progress(!args.quiet);

    let insights = narrator.insights(&summary).await;
    let narrative = narrator.narrative(&summary, &insights).await;

    // Step 3: Charts
    println!("\n📈 Drawing charts...");
    let charts = match report::render_charts(&summary, &config.general.chart_dir) {
        Ok(paths) => paths,
        Err(e) => {
            warn!("Chart rendering failed, continuing without charts: {:#}", e);
            Vec::new()
        }
    };

    // Step 4: PDF
    println!("\n📝 Generating report...");
    let output = &config.general.output;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    report::render_report(&narrative, &charts, output, &config.pdf)?;

    print_summary(&summary);
    println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
    println!("\n✅ Report complete! Saved to: {}", output.display());

    Ok(0)
}

/// Print the headline statistics.
fn print_summary(summary: &Summary) {
    let overall = &summary.overall_performance;

    println!("\n📊 Performance Summary:");
    println!(
        "   Questions: {} | Attempted: {} | Correct: {}",
        summary.test_info.total_questions, overall.total_attempted, overall.total_correct
    );
    println!(
        "   Marks: {} / {} | Accuracy: {:.1}%",
        overall.total_marks_scored, summary.test_info.total_marks, overall.accuracy
    );
    for subject in &summary.subject_wise {
        println!(
            "   - {}: {:.1}% ({} correct of {} attempted)",
            subject.name, subject.accuracy, subject.correct_answers, subject.questions_attempted
        );
    }
    for section in &summary.section_wise {
        let analysis = &section.analysis;
        println!(
            "   - {}: {} correct, {} incorrect, {} unattempted",
            section.title,
            analysis.correct_answers,
            analysis.incorrect_answers,
            analysis.unattempted
        );
    }
}

fn write_summary_json(summary: &Summary, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("Failed to serialize summary")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write summary to {}", path.display()))?;
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

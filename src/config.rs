//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.scorecard.toml` files and resolving the LLM credential from the
//! environment.

use crate::analysis::{subjects::default_subject_names, BreakdownPolicy, SubjectTable};
use crate::error::ReportError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".scorecard.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Aggregation settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// PDF layout settings.
    #[serde(default)]
    pub pdf: PdfConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output PDF path.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Directory for generated chart images.
    #[serde(default = "default_chart_dir")]
    pub chart_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            chart_dir: default_chart_dir(),
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("output/report.pdf")
}

fn default_chart_dir() -> PathBuf {
    PathBuf::from("output")
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Base URL of the generative language API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            api_url: default_api_url(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
        }
    }
}

pub(crate) fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

pub(crate) fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_api_key_env() -> String {
    "GOOGLE_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout() -> u64 {
    120
}

/// Aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Which questions feed the chapter and topic breakdowns.
    #[serde(default)]
    pub breakdown_policy: BreakdownPolicy,

    /// Subject identifier to display name.
    #[serde(default = "default_subject_names")]
    pub subjects: BTreeMap<String, String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            breakdown_policy: BreakdownPolicy::default(),
            subjects: default_subject_names(),
        }
    }
}

impl AnalysisConfig {
    pub fn subject_table(&self) -> SubjectTable {
        SubjectTable::new(self.subjects.clone())
    }
}

/// PDF layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfConfig {
    /// Title printed at the top of the first page.
    #[serde(default = "default_title")]
    pub title: String,

    /// Directory holding the TrueType font files.
    #[serde(default = "default_font_dir")]
    pub font_dir: PathBuf,

    /// Font family name; files are `<family>-Regular.ttf`, `-Bold`, `-Italic`, `-BoldItalic`.
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Fall back to Liberation Sans or DejaVu Sans from the system font
    /// directories when the configured family is missing.
    #[serde(default = "default_true")]
    pub system_fonts: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            font_dir: default_font_dir(),
            font_family: default_font_family(),
            system_fonts: true,
        }
    }
}

fn default_title() -> String {
    "Student Performance Report".to_string()
}

fn default_font_dir() -> PathBuf {
    PathBuf::from("fonts")
}

fn default_font_family() -> String {
    "LiberationSans".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.clone();
        }
        if let Some(ref chart_dir) = args.chart_dir {
            self.general.chart_dir = chart_dir.clone();
        }

        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref api_url) = args.api_url {
            self.model.api_url = api_url.clone();
        }
        if let Some(temperature) = args.temperature {
            self.model.temperature = temperature;
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }

        // Flags always override
        if args.attempted_only {
            self.analysis.breakdown_policy = BreakdownPolicy::AttemptedOnly;
        }
    }

    /// Read the API key named by `model.api_key_env`.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    pub fn api_key(&self) -> Result<String, ReportError> {
        dotenvy::dotenv().ok();
        self.api_key_from(|name| std::env::var(name).ok())
    }

    fn api_key_from(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<String, ReportError> {
        let name = &self.model.api_key_env;
        match lookup(name) {
            Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(ReportError::Config(missing_key_help(name))),
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

fn missing_key_help(name: &str) -> String {
    format!(
        "{name} not found!\n\n\
         Please do ONE of the following:\n\n\
         1. Create a .env file in the project root with:\n   \
            {name}=your_api_key_here\n\n\
         2. OR export it in your shell:\n   \
            export {name}=your_api_key_here\n\n\
         You can get an API key from https://ai.google.dev/"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.name, "gemini-2.0-flash");
        assert_eq!(config.model.api_key_env, "GOOGLE_API_KEY");
        assert_eq!(config.general.output, PathBuf::from("output/report.pdf"));
        assert_eq!(config.analysis.breakdown_policy, BreakdownPolicy::AllQuestions);
        assert_eq!(config.analysis.subjects.len(), 3);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "reports/alice.pdf"

[model]
name = "gemini-1.5-pro"
temperature = 0.2

[analysis]
breakdown_policy = "attempted_only"

[analysis.subjects]
"abc123" = "Biology"

[pdf]
font_family = "DejaVuSans"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, PathBuf::from("reports/alice.pdf"));
        assert_eq!(config.general.chart_dir, PathBuf::from("output"));
        assert_eq!(config.model.name, "gemini-1.5-pro");
        assert_eq!(config.model.temperature, 0.2);
        assert_eq!(config.model.timeout_seconds, 120);
        assert_eq!(config.analysis.breakdown_policy, BreakdownPolicy::AttemptedOnly);
        assert_eq!(config.analysis.subject_table().resolve("abc123"), "Biology");
        assert_eq!(config.pdf.font_family, "DejaVuSans");
        assert!(config.pdf.system_fonts);
        assert_eq!(config.pdf.title, "Student Performance Report");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[model]"));
        assert!(toml_str.contains("[analysis.subjects]"));
        assert!(toml_str.contains("[pdf]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.analysis.subjects, default_subject_names());
    }

    #[test]
    fn test_merge_with_args() {
        let args = crate::cli::Args {
            input: Some(PathBuf::from("attempt.json")),
            output: Some(PathBuf::from("out/bob.pdf")),
            chart_dir: None,
            model: Some("gemini-1.5-flash".to_string()),
            api_url: None,
            config: None,
            verbose: false,
            quiet: false,
            timeout: Some(30),
            temperature: None,
            attempted_only: true,
            summary_json: None,
            dry_run: false,
            init_config: false,
        };

        let mut config = Config::default();
        config.merge_with_args(&args);

        assert_eq!(config.general.output, PathBuf::from("out/bob.pdf"));
        assert_eq!(config.general.chart_dir, PathBuf::from("output"));
        assert_eq!(config.model.name, "gemini-1.5-flash");
        assert_eq!(config.model.api_url, default_api_url());
        assert_eq!(config.model.timeout_seconds, 30);
        assert_eq!(config.model.temperature, 0.7);
        assert_eq!(config.analysis.breakdown_policy, BreakdownPolicy::AttemptedOnly);
    }

    #[test]
    fn test_api_key_lookup() {
        let config = Config::default();

        let key = config
            .api_key_from(|name| (name == "GOOGLE_API_KEY").then(|| " secret ".to_string()))
            .unwrap();
        assert_eq!(key, "secret");

        let err = config.api_key_from(|_| None).unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
        assert!(err.to_string().contains(".env"));

        assert!(config.api_key_from(|_| Some("   ".to_string())).is_err());
    }
}

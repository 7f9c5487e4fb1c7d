//! Font lookup for the PDF report.
//!
//! Candidates are tried in order: the directory named by
//! `SCORECARD_FONT_DIR`, the configured `pdf.font_dir`, then (unless
//! `pdf.system_fonts` is off) a few well-known system families.

use crate::config::{PdfConfig, CONFIG_FILE_NAME};
use crate::error::ReportError;
use genpdf::fonts::{FontData, FontFamily};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Overrides the configured font directory.
pub const FONT_DIR_ENV: &str = "SCORECARD_FONT_DIR";

// Regular, bold, italic, bold italic.
const LIBERATION_FILES: [&str; 4] = [
    "LiberationSans-Regular.ttf",
    "LiberationSans-Bold.ttf",
    "LiberationSans-Italic.ttf",
    "LiberationSans-BoldItalic.ttf",
];

const DEJAVU_FILES: [&str; 4] = [
    "DejaVuSans.ttf",
    "DejaVuSans-Bold.ttf",
    "DejaVuSans-Oblique.ttf",
    "DejaVuSans-BoldOblique.ttf",
];

const MACOS_ARIAL_FILES: [&str; 4] = [
    "Arial.ttf",
    "Arial Bold.ttf",
    "Arial Italic.ttf",
    "Arial Bold Italic.ttf",
];

const WINDOWS_ARIAL_FILES: [&str; 4] = ["arial.ttf", "arialbd.ttf", "ariali.ttf", "arialbi.ttf"];

const SYSTEM_FONTS: &[(&str, [&str; 4])] = &[
    ("/usr/share/fonts/truetype/liberation", LIBERATION_FILES),
    ("/usr/share/fonts/truetype/liberation2", LIBERATION_FILES),
    ("/usr/share/fonts/liberation-sans", LIBERATION_FILES),
    ("/usr/share/fonts/truetype/dejavu", DEJAVU_FILES),
    ("/usr/share/fonts/dejavu-sans-fonts", DEJAVU_FILES),
    ("/usr/share/fonts/dejavu", DEJAVU_FILES),
    ("/usr/share/fonts/TTF", DEJAVU_FILES),
    ("/System/Library/Fonts/Supplemental", MACOS_ARIAL_FILES),
    ("C:\\Windows\\Fonts", WINDOWS_ARIAL_FILES),
];

/// A directory plus the four files that make up one family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSource {
    pub dir: PathBuf,
    pub files: [String; 4],
}

impl FontSource {
    /// `<family>-Regular.ttf`, `-Bold`, `-Italic` and `-BoldItalic` in `dir`.
    pub fn family(dir: &Path, family: &str) -> Self {
        let file = |variant: &str| format!("{}-{}.ttf", family, variant);
        Self {
            dir: dir.to_path_buf(),
            files: [
                file("Regular"),
                file("Bold"),
                file("Italic"),
                file("BoldItalic"),
            ],
        }
    }

    fn system(dir: &str, files: [&str; 4]) -> Self {
        Self {
            dir: PathBuf::from(dir),
            files: files.map(String::from),
        }
    }

    pub fn missing(&self) -> Vec<&str> {
        self.files
            .iter()
            .filter(|name| !self.dir.join(name.as_str()).is_file())
            .map(String::as_str)
            .collect()
    }

    fn load(&self) -> Result<FontFamily<FontData>, genpdf::error::Error> {
        let load = |name: &str| FontData::load(self.dir.join(name), None);
        Ok(FontFamily {
            regular: load(&self.files[0])?,
            bold: load(&self.files[1])?,
            italic: load(&self.files[2])?,
            bold_italic: load(&self.files[3])?,
        })
    }
}

/// Every place a usable family may live, most specific first.
pub fn font_candidates(config: &PdfConfig, override_dir: Option<PathBuf>) -> Vec<FontSource> {
    let mut candidates = Vec::new();

    if let Some(dir) = override_dir {
        candidates.push(FontSource::family(&dir, &config.font_family));
    }

    let configured = FontSource::family(&config.font_dir, &config.font_family);
    if !candidates.contains(&configured) {
        candidates.push(configured);
    }

    if config.system_fonts {
        candidates.extend(
            SYSTEM_FONTS
                .iter()
                .map(|(dir, files)| FontSource::system(dir, *files)),
        );
    }

    candidates
}

/// Load the first complete family among [`font_candidates`].
pub fn resolve_font_family(config: &PdfConfig) -> Result<FontFamily<FontData>, ReportError> {
    let candidates = font_candidates(config, env_path(FONT_DIR_ENV));
    load_first(&candidates, &config.font_family)
}

fn load_first(
    candidates: &[FontSource],
    family: &str,
) -> Result<FontFamily<FontData>, ReportError> {
    let mut attempts = Vec::new();

    for (i, source) in candidates.iter().enumerate() {
        let missing = source.missing();
        if !missing.is_empty() {
            attempts.push(format!(
                "{} (missing {})",
                source.dir.display(),
                missing.join(", ")
            ));
            continue;
        }

        match source.load() {
            Ok(fonts) => {
                if i > 0 {
                    warn!(
                        "Font family '{}' not found, using {}",
                        family,
                        source.dir.join(&source.files[0]).display()
                    );
                } else {
                    debug!("Fonts loaded from {}", source.dir.display());
                }
                return Ok(fonts);
            }
            Err(e) => attempts.push(format!("{} ({})", source.dir.display(), e)),
        }
    }

    Err(ReportError::Config(format!(
        "no usable fonts found. Checked: {}. Place the '{}' TrueType family in \
         pdf.font_dir ({}), set {}, or install Liberation Sans or DejaVu Sans",
        attempts.join("; "),
        family,
        CONFIG_FILE_NAME,
        FONT_DIR_ENV
    )))
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_without_system_fonts(dir: &Path) -> PdfConfig {
        PdfConfig {
            font_dir: dir.to_path_buf(),
            system_fonts: false,
            ..PdfConfig::default()
        }
    }

    #[test]
    fn test_family_file_names() {
        let source = FontSource::family(Path::new("fonts"), "LiberationSans");
        assert_eq!(source.files[0], "LiberationSans-Regular.ttf");
        assert_eq!(source.files[3], "LiberationSans-BoldItalic.ttf");
        assert_eq!(source.missing().len(), 4);
    }

    #[test]
    fn test_override_comes_first() {
        let config = config_without_system_fonts(Path::new("fonts"));
        let candidates = font_candidates(&config, Some(PathBuf::from("/opt/fonts")));

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].dir, PathBuf::from("/opt/fonts"));
        assert_eq!(candidates[1].dir, PathBuf::from("fonts"));
    }

    #[test]
    fn test_override_matching_config_is_not_repeated() {
        let config = config_without_system_fonts(Path::new("fonts"));
        let candidates = font_candidates(&config, Some(PathBuf::from("fonts")));
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_system_fonts_follow_configured_family() {
        let config = PdfConfig::default();
        let candidates = font_candidates(&config, None);

        assert_eq!(candidates[0], FontSource::family(Path::new("fonts"), "LiberationSans"));
        assert!(candidates.len() > 1);
        assert!(candidates
            .iter()
            .any(|c| c.files[0] == "DejaVuSans.ttf"));
    }

    #[test]
    fn test_nothing_found_lists_every_attempt() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_without_system_fonts(&dir.path().join("none"));
        let candidates = font_candidates(&config, Some(dir.path().to_path_buf()));

        let err = load_first(&candidates, &config.font_family).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, ReportError::Config(_)));
        assert!(message.contains("LiberationSans-Regular.ttf"));
        assert!(message.contains(&dir.path().join("none").display().to_string()));
        assert!(message.contains(FONT_DIR_ENV));
    }

    #[test]
    fn test_unreadable_font_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let source = FontSource::family(dir.path(), "Broken");
        for name in &source.files {
            std::fs::write(dir.path().join(name), b"not a font").unwrap();
        }
        assert!(source.missing().is_empty());

        let err = load_first(&[source], "Broken").unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }
}

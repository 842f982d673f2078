//! Book configuration module.
//!
//! Handles loading and validating `book.toml` from the data directory.
//! User files are sparse: values merge on top of stock defaults, unknown
//! keys are rejected to catch typos early.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! title = "Cookbook"        # Cover page title
//! subtitle = ""             # Cover page subtitle (omitted when empty)
//!
//! [page]
//! paper = "A4"              # A4, Letter, or A5
//! landscape = false
//! margins = [0.4, 0.4, 0.4, 0.4]  # top/right/bottom/left, inches
//! print_background = true   # Print CSS backgrounds (photos stay either way)
//!
//! [styles]
//! css = []                  # Extra stylesheets, relative to the data dir
//!
//! [sections]
//! contents = true           # Table of contents after the cover
//! ingredient_index = true   # Ingredient index at the back of the book
//!
//! [export]
//! attempts = 3              # Print attempts before giving up
//! filename = "cookbook.pdf" # Output file name inside the output dir
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Book configuration loaded from `book.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BookConfig {
    /// Cover page title.
    pub title: String,
    /// Cover page subtitle. Empty string omits the element.
    pub subtitle: String,
    /// Physical page setup, mapped onto the print engine's options.
    pub page: PageConfig,
    /// Extra stylesheets appended after the built-in one.
    pub styles: StylesConfig,
    /// Optional book sections.
    pub sections: SectionsConfig,
    /// PDF export settings.
    pub export: ExportConfig,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            title: "Cookbook".to_string(),
            subtitle: String::new(),
            page: PageConfig::default(),
            styles: StylesConfig::default(),
            sections: SectionsConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl BookConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.export.attempts == 0 {
            return Err(ConfigError::Validation(
                "export.attempts must be at least 1".into(),
            ));
        }
        if self.export.filename.trim().is_empty() {
            return Err(ConfigError::Validation(
                "export.filename must not be empty".into(),
            ));
        }
        if self.page.margins.iter().any(|m| *m < 0.0) {
            return Err(ConfigError::Validation(
                "page.margins values must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// Supported paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Paper {
    A4,
    Letter,
    A5,
}

impl Paper {
    /// Paper dimensions as (width, height) in inches, portrait orientation.
    pub fn dimensions_inches(self) -> (f64, f64) {
        match self {
            Paper::A4 => (8.27, 11.69),
            Paper::Letter => (8.5, 11.0),
            Paper::A5 => (5.83, 8.27),
        }
    }
}

/// Physical page setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    /// Paper size.
    pub paper: Paper,
    /// Landscape orientation.
    pub landscape: bool,
    /// Page margins as `[top, right, bottom, left]` in inches.
    pub margins: [f64; 4],
    /// Whether the engine prints CSS background colors and images.
    pub print_background: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            paper: Paper::A4,
            landscape: false,
            margins: [0.4, 0.4, 0.4, 0.4],
            print_background: true,
        }
    }
}

/// Extra stylesheets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StylesConfig {
    /// Stylesheet paths relative to the data dir, inlined after the
    /// built-in stylesheet in listed order.
    pub css: Vec<String>,
}

/// Optional book sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SectionsConfig {
    /// Table of contents page after the cover.
    pub contents: bool,
    /// Ingredient index at the back of the book.
    pub ingredient_index: bool,
}

impl Default for SectionsConfig {
    fn default() -> Self {
        Self {
            contents: true,
            ingredient_index: true,
        }
    }
}

/// PDF export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Print attempts before the export fails with the last error.
    pub attempts: u32,
    /// Output file name inside the output directory.
    pub filename: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            filename: "cookbook.pdf".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Name of the config file within the data directory.
pub const CONFIG_FILENAME: &str = "book.toml";

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(BookConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `book.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `book.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from `book.toml` in the data directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(data_dir: &Path) -> Result<BookConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match load_raw_config(data_dir)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: BookConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `book.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Cookpress Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as book.toml in the data directory.
# Unknown keys will cause an error.

# Cover page title and subtitle (subtitle is omitted when empty).
title = "Cookbook"
subtitle = ""

# ---------------------------------------------------------------------------
# Page setup
# ---------------------------------------------------------------------------
[page]
# Paper size: "A4", "Letter", or "A5".
paper = "A4"

# Landscape orientation.
landscape = false

# Page margins as [top, right, bottom, left] in inches.
margins = [0.4, 0.4, 0.4, 0.4]

# Print CSS background colors and images.
print_background = true

# ---------------------------------------------------------------------------
# Stylesheets
# ---------------------------------------------------------------------------
[styles]
# Extra stylesheets, relative to the data dir, inlined after the built-in
# one in listed order. Later sheets override earlier rules.
css = []

# ---------------------------------------------------------------------------
# Sections
# ---------------------------------------------------------------------------
[sections]
# Table of contents page after the cover.
contents = true

# Ingredient index at the back of the book, with page references.
ingredient_index = true

# ---------------------------------------------------------------------------
# Export
# ---------------------------------------------------------------------------
[export]
# Print attempts before giving up (each attempt opens a fresh tab).
attempts = 3

# Output file name inside the output directory.
filename = "cookbook.pdf"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();

        assert_eq!(config.title, "Cookbook");
        assert_eq!(config.page.paper, Paper::A4);
        assert_eq!(config.export.attempts, 3);
        assert_eq!(config.export.filename, "cookbook.pdf");
        assert!(config.sections.contents);
    }

    #[test]
    fn sparse_override_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            "title = \"Family Recipes\"\n\n[page]\npaper = \"Letter\"\n",
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.title, "Family Recipes");
        assert_eq!(config.page.paper, Paper::Letter);
        // Untouched sections keep defaults
        assert_eq!(config.page.margins, [0.4, 0.4, 0.4, 0.4]);
        assert_eq!(config.export.attempts, 3);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "titel = \"oops\"\n").unwrap();

        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "title = [broken\n").unwrap();

        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn zero_attempts_fails_validation() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "[export]\nattempts = 0\n").unwrap();

        let err = load_config(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("attempts"));
    }

    #[test]
    fn empty_filename_fails_validation() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "[export]\nfilename = \" \"\n").unwrap();

        let err = load_config(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("filename"));
    }

    #[test]
    fn negative_margin_fails_validation() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            "[page]\nmargins = [0.4, -0.1, 0.4, 0.4]\n",
        )
        .unwrap();

        let err = load_config(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("margins"));
    }

    #[test]
    fn merge_overlay_wins_on_conflict() {
        let base: toml::Value = toml::from_str("a = 1\n[t]\nx = 1\ny = 2").unwrap();
        let overlay: toml::Value = toml::from_str("[t]\nx = 9").unwrap();

        let merged = merge_toml(base, overlay);
        let t = merged.get("t").unwrap();
        assert_eq!(t.get("x").unwrap().as_integer(), Some(9));
        assert_eq!(t.get("y").unwrap().as_integer(), Some(2));
        assert_eq!(merged.get("a").unwrap().as_integer(), Some(1));
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let parsed: toml::Value = toml::from_str(stock_config_toml()).unwrap();
        let config: BookConfig = parsed.try_into().unwrap();
        config.validate().unwrap();
        assert_eq!(config.title, BookConfig::default().title);
        assert_eq!(config.page.margins, BookConfig::default().page.margins);
    }

    #[test]
    fn paper_dimensions() {
        assert_eq!(Paper::A4.dimensions_inches(), (8.27, 11.69));
        assert_eq!(Paper::Letter.dimensions_inches(), (8.5, 11.0));
        assert_eq!(Paper::A5.dimensions_inches(), (5.83, 8.27));
    }
}

//! Configuration system for the grade catalog

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::table::DEFAULT_HEADER_ROW;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarksConfig {
    /// Directory holding one spreadsheet per module and year
    pub data_dir: PathBuf,
    /// Academic years offered for selection. Cosmetic: data is never filtered by it
    pub displayed_years: Vec<String>,
    /// Recognized spreadsheet extensions, compared case-insensitively
    pub extensions: Vec<String>,
    /// File names starting with this are editor lock files
    pub temp_prefix: String,
    /// 0-based row of the header in summary pages
    pub header_row: u32,
    pub on_label_collision: CollisionPolicy,
    pub columns: ColumnsConfig,
}

impl MarksConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: MarksConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Reject values that would make loading meaningless
    pub fn validate(&self) -> Result<()> {
        let year_range = Regex::new(r"^\d{4}-\d{4}$")?;
        for year in &self.displayed_years {
            if !year_range.is_match(year) {
                anyhow::bail!(
                    "Configuration error: displayed year '{}' is not of the form YYYY-YYYY",
                    year
                );
            }
        }

        if self.extensions.is_empty() {
            anyhow::bail!("Configuration error: 'extensions' must list at least one extension");
        }

        if self.temp_prefix.is_empty() {
            anyhow::bail!("Configuration error: 'temp_prefix' must not be empty");
        }

        if self.columns.final_grade.is_empty() {
            anyhow::bail!("Configuration error: 'columns.final_grade' must not be empty");
        }

        Ok(())
    }

    /// The year selected by default: the last one listed
    pub fn default_year(&self) -> Option<&str> {
        self.displayed_years.last().map(String::as_str)
    }
}

impl Default for MarksConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("res/marks"),
            displayed_years: vec![
                "2022-2023".to_string(),
                "2023-2024".to_string(),
                "2024-2025".to_string(),
            ],
            extensions: vec!["xlsx".to_string()],
            temp_prefix: "~".to_string(),
            header_row: DEFAULT_HEADER_ROW,
            on_label_collision: CollisionPolicy::default(),
            columns: ColumnsConfig::default(),
        }
    }
}

/// What to do when two datasets end up under the same column label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Report it; the later dataset's value is kept
    #[default]
    Warn,
    /// Refuse to aggregate
    Error,
}

/// Column names of the module tables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnsConfig {
    pub final_grade: String,
    /// Used when `final_grade` is absent from a table
    pub fallback_grade: String,
    pub pre_rounding_grade: String,
    pub status: String,
    pub passed: String,
    pub failed: String,
    /// Columns starting with any of these are not course units
    pub excluded_prefixes: Vec<String>,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            final_grade: "Note du module".to_string(),
            fallback_grade: "Note finale".to_string(),
            pre_rounding_grade: "Note avant arrondi".to_string(),
            status: "Module".to_string(),
            passed: "Réussi".to_string(),
            failed: "Echec".to_string(),
            excluded_prefixes: vec![
                "Note".to_string(),
                "Module".to_string(),
                "Temps partiel".to_string(),
                "Remarques".to_string(),
            ],
        }
    }
}

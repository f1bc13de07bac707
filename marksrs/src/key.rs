//! Dataset identifiers parsed from file names

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// `(module_code, module_name, academic_year)` parsed from a file name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DatasetKey {
    /// Three-digit module code, e.g. "205"
    pub module_code: String,
    /// Free text between the code and the academic year, kept verbatim
    pub module_name: String,
    /// "YYYY-YYYY"
    pub academic_year: String,
}

impl DatasetKey {
    pub fn new(
        module_code: impl Into<String>,
        module_name: impl Into<String>,
        academic_year: impl Into<String>,
    ) -> Self {
        Self {
            module_code: module_code.into(),
            module_name: module_name.into(),
            academic_year: academic_year.into(),
        }
    }

    /// Name shown in the module browser: code followed by the raw name
    pub fn display_name(&self) -> String {
        format!("{} {}", self.module_code, self.module_name)
    }

    /// Cohort level: the leading digit of the module code
    pub fn level(&self) -> Option<char> {
        self.module_code.chars().next()
    }
}

fn key_pattern() -> &'static Regex {
    static KEY_RE: OnceLock<Regex> = OnceLock::new();
    KEY_RE.get_or_init(|| Regex::new(r"(\d{3})(.*?)(\d{4}-\d{4})").unwrap())
}

fn year_pattern() -> &'static Regex {
    static YEAR_RE: OnceLock<Regex> = OnceLock::new();
    YEAR_RE.get_or_init(|| Regex::new(r"(?:19|20)\d{2}").unwrap())
}

/// Extract the dataset key from a raw file name.
///
/// The pattern is three digits, any text, then a `YYYY-YYYY` range, matched
/// anywhere in the name. When the name holds several candidates only the
/// leftmost one is used. Returns `None` when nothing matches; reporting that
/// is up to the caller.
pub fn extract_key(raw_name: &str) -> Option<DatasetKey> {
    let caps = key_pattern().captures(raw_name)?;
    Some(DatasetKey::new(&caps[1], &caps[2], &caps[3]))
}

/// Column label for a dataset: the name up to its first year.
///
/// `"205 DataStructures2024-2025.xlsx"` becomes `"205 DataStructures"`, so
/// files of the same module that only differ by year share a label. A name
/// that would be cut down to nothing is returned whole.
pub fn normalize_label(name: &str) -> String {
    match year_pattern().find(name) {
        Some(m) if m.start() > 0 => name[..m.start()].to_string(),
        _ => name.to_string(),
    }
}

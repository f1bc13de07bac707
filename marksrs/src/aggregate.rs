//! Student-by-module matrix of final grades for a cohort level

use crate::catalog::Catalog;
use crate::config::{CollisionPolicy, MarksConfig};
use crate::diagnostics::Diagnostic;
use crate::error::AggregateError;
use crate::key::normalize_label;
use crate::level::LevelFilter;
use crate::reader::CellValue;
use crate::schema::{ColumnResolution, resolve_column};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// How grades are found and label clashes handled
#[derive(Debug, Clone)]
pub struct AggregateOptions {
    pub final_grade: String,
    pub fallback_grade: String,
    pub on_collision: CollisionPolicy,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self::from(&MarksConfig::default())
    }
}

impl From<&MarksConfig> for AggregateOptions {
    fn from(config: &MarksConfig) -> Self {
        Self {
            final_grade: config.columns.final_grade.clone(),
            fallback_grade: config.columns.fallback_grade.clone(),
            on_collision: config.on_label_collision,
        }
    }
}

/// Final grades of every student of a level, one column per module
#[derive(Debug, Clone, Default, Serialize)]
pub struct Aggregation {
    /// Module labels, sorted
    pub columns: Vec<String>,
    /// Student name to label to grade, sorted by student
    pub rows: BTreeMap<String, BTreeMap<String, CellValue>>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Aggregation {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn students(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// Grade of a student in a module; `None` when the student did not take it
    pub fn grade(&self, student: &str, label: &str) -> Option<&CellValue> {
        self.rows.get(student)?.get(label)
    }
}

/// Pivot the tables selected by `levels` into one matrix.
///
/// Each table contributes one column, labelled by its file name cut at the
/// first year. The grade comes from the final grade column, or the fallback
/// column when a table uses the alternate layout; a table with neither still
/// contributes its students, with empty grades. Students with no module left
/// are dropped.
pub fn aggregate(
    catalog: &Catalog,
    levels: &LevelFilter,
    options: &AggregateOptions,
) -> Result<Aggregation, AggregateError> {
    let mut owners: BTreeMap<String, String> = BTreeMap::new();
    let mut rows: BTreeMap<String, BTreeMap<String, CellValue>> = BTreeMap::new();
    let mut diagnostics = Vec::new();

    for (file_name, key, table) in catalog.select(levels) {
        let label = normalize_label(file_name);

        if let Some(previous) = owners.get(&label) {
            match options.on_collision {
                CollisionPolicy::Error => {
                    return Err(AggregateError::Collision {
                        label,
                        first: previous.clone(),
                        second: file_name.to_string(),
                    });
                }
                CollisionPolicy::Warn => {
                    warn!(label = %label, first = %previous, second = %file_name, "column label collision");
                    diagnostics.push(Diagnostic::collision(
                        &label,
                        format!("{} overrides {} for students present in both", file_name, previous),
                    ));
                }
            }
        }
        owners.insert(label.clone(), file_name.to_string());

        let grade_column =
            match resolve_column(table, &options.final_grade, &options.fallback_grade) {
                ColumnResolution::Found(col) => Some(col),
                ColumnResolution::FallbackUsed(col) => {
                    debug!(file = %file_name, column = %options.fallback_grade, "fallback grade column");
                    diagnostics.push(Diagnostic::fallback(
                        file_name,
                        format!(
                            "'{}' not found, using '{}'",
                            options.final_grade, options.fallback_grade
                        ),
                    ));
                    Some(col)
                }
                ColumnResolution::Missing => {
                    warn!(file = %file_name, module = %key.module_code, "no grade column");
                    diagnostics.push(Diagnostic::schema(
                        file_name,
                        format!(
                            "neither '{}' nor '{}' found; grades left empty",
                            options.final_grade, options.fallback_grade
                        ),
                    ));
                    None
                }
            };

        for row in 0..table.len() {
            let Some(student) = table.student_name(row) else {
                continue;
            };
            let grade = grade_column
                .map(|col| table.value(row, col).clone())
                .unwrap_or_default();
            rows.entry(student).or_default().insert(label.clone(), grade);
        }
    }

    rows.retain(|_, grades| !grades.is_empty());

    let columns: BTreeSet<&String> = rows.values().flat_map(|grades| grades.keys()).collect();
    let columns = columns.into_iter().cloned().collect();

    diagnostics.sort();
    Ok(Aggregation {
        columns,
        rows,
        diagnostics,
    })
}

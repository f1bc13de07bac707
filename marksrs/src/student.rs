//! Everything known about one student, across all modules

use crate::catalog::Catalog;
use crate::config::ColumnsConfig;
use crate::key::normalize_label;
use crate::reader::CellValue;
use crate::table::Table;
use serde::Serialize;

/// Outcome of a module as written in its status column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModuleStatus {
    Passed,
    Failed,
    /// Status cell left blank
    Undetermined,
    /// Anything else, including a missing status column
    Unknown,
}

impl ModuleStatus {
    fn from_cell(value: Option<&CellValue>, columns: &ColumnsConfig) -> Self {
        match value {
            None => ModuleStatus::Unknown,
            Some(v) if v.is_empty() => ModuleStatus::Undetermined,
            Some(CellValue::Text(s)) if s.trim() == columns.passed => ModuleStatus::Passed,
            Some(CellValue::Text(s)) if s.trim() == columns.failed => ModuleStatus::Failed,
            Some(_) => ModuleStatus::Unknown,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            ModuleStatus::Passed => "✅",
            ModuleStatus::Failed => "❌",
            ModuleStatus::Undetermined => "Indéterminé ❓",
            ModuleStatus::Unknown => "❓",
        }
    }
}

/// Grade of one course unit of a module
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseUnit {
    pub name: String,
    pub grade: CellValue,
}

/// A student's line in one module table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleResult {
    pub file_name: String,
    pub label: String,
    pub status: ModuleStatus,
    pub final_grade: CellValue,
    /// Rounded to one decimal
    pub pre_rounding_grade: Option<f64>,
    pub course_units: Vec<CourseUnit>,
}

/// All module results of one student, sorted by label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentReport {
    pub student: String,
    pub modules: Vec<ModuleResult>,
}

impl StudentReport {
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Collect the rows of `student` from every table of the catalog.
///
/// Tables without a key are included: this view is not filtered by module.
pub fn student_report(catalog: &Catalog, student: &str, columns: &ColumnsConfig) -> StudentReport {
    let mut modules: Vec<ModuleResult> = catalog
        .tables()
        .flat_map(|(file_name, table)| {
            table
                .rows_for_student(student)
                .map(move |row| module_result(file_name, table, row, columns))
        })
        .collect();
    modules.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.file_name.cmp(&b.file_name)));

    StudentReport {
        student: student.to_string(),
        modules,
    }
}

fn module_result(file_name: &str, table: &Table, row: usize, columns: &ColumnsConfig) -> ModuleResult {
    let final_grade = table
        .get(row, &columns.final_grade)
        .or_else(|| table.get(row, &columns.fallback_grade))
        .cloned()
        .unwrap_or_default();

    let pre_rounding_grade = table
        .get(row, &columns.pre_rounding_grade)
        .and_then(CellValue::as_number)
        .and_then(round_one_decimal);

    // The two name columns come first; everything else not excluded is a course unit
    let course_units = table
        .columns
        .iter()
        .enumerate()
        .skip(2)
        .filter(|(_, name)| !columns.excluded_prefixes.iter().any(|p| name.starts_with(p.as_str())))
        .map(|(col, name)| CourseUnit {
            name: name.clone(),
            grade: table.value(row, col).clone(),
        })
        .collect();

    ModuleResult {
        file_name: file_name.to_string(),
        label: normalize_label(file_name),
        status: ModuleStatus::from_cell(table.get(row, &columns.status), columns),
        final_grade,
        pre_rounding_grade,
        course_units,
    }
}

/// Nearest one-decimal value, ties to even on the exact binary value
fn round_one_decimal(grade: f64) -> Option<f64> {
    format!("{:.1}", grade).parse().ok()
}

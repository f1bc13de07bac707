//! Output formatters for catalogs, tables and reports

use anyhow::Result;
use colored::*;
use marksrs::diagnostics::count_severity;
use marksrs::{
    Aggregation, CellValue, ColumnsConfig, Diagnostic, MarksConfig, ModuleChoice, ModuleStatus,
    Severity, StudentReport, Table,
};
use serde::Serialize;

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_years(config: &MarksConfig) {
    let default = config.default_year();
    for year in &config.displayed_years {
        if Some(year.as_str()) == default {
            println!("{} {}", year.bold(), "(default)".bright_black());
        } else {
            println!("{}", year);
        }
    }
}

/// Print selectable modules followed by what was left out of the catalog
pub fn print_modules(choices: &[ModuleChoice], diagnostics: &[Diagnostic]) {
    if choices.is_empty() {
        println!("{}", "No modules found".yellow().bold());
    }
    for choice in choices {
        println!(
            "{} {}",
            choice.display_name.cyan().bold(),
            format!("({})", choice.file_name).bright_black()
        );
    }
    print_diagnostics(diagnostics);
}

/// Print the whole table of one module, status column highlighted
pub fn print_module(file_name: &str, table: &Table, columns: &ColumnsConfig) {
    println!("{}", format!("Module: {}", file_name).bold());
    println!();

    if table.is_empty() {
        println!("{}", "No students".yellow());
        return;
    }

    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(col, name)| {
            (0..table.len())
                .map(|row| table.value(row, col).to_string().chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(name, width)| pad(name, *width))
        .collect();
    println!("{}", header.join(" | ").bold().underline());

    let status_col = table.column_index(&columns.status);
    for row in 0..table.len() {
        let line: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(col, width)| {
                let text = pad(&table.value(row, col).to_string(), *width);
                if Some(col) != status_col {
                    return text;
                }
                match table.value(row, col) {
                    CellValue::Text(s) if s.trim() == columns.passed => text.green().to_string(),
                    CellValue::Text(s) if s.trim() == columns.failed => text.red().to_string(),
                    _ => text,
                }
            })
            .collect();
        println!("{}", line.join(" | "));
    }
}

/// Print every module of one student with its course units
pub fn print_student(report: &StudentReport) {
    println!("{}", format!("Student: {}", report.student).bold());
    println!();

    for module in &report.modules {
        let status = match module.status {
            ModuleStatus::Passed => module.status.symbol().green(),
            ModuleStatus::Failed => module.status.symbol().red(),
            _ => module.status.symbol().yellow(),
        };
        println!("{} {}", module.label.cyan().bold(), status);

        let pre_rounding = module
            .pre_rounding_grade
            .map(|g| format!("{:.1}", g))
            .unwrap_or_default();
        println!(
            "  {} {}  {} {}",
            "Final:".bold(),
            module.final_grade,
            "Before rounding:".bright_black(),
            pre_rounding
        );
        for unit in &module.course_units {
            println!("    {} {}", unit.name, unit.grade.to_string().bright_black());
        }
        println!();
    }
}

/// Print the cohort matrix, students as rows and modules as columns
pub fn print_cohort(aggregation: &Aggregation, load_diagnostics: &[Diagnostic]) {
    if aggregation.is_empty() {
        println!("{}", "No students for these levels".yellow().bold());
    } else {
        let name_width = aggregation
            .students()
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(0);

        let mut header = vec![pad("", name_width)];
        header.extend(aggregation.columns.iter().cloned());
        println!("{}", header.join(" | ").bold().underline());

        for (student, grades) in &aggregation.rows {
            let mut line = vec![pad(student, name_width).cyan().to_string()];
            for label in &aggregation.columns {
                let cell = grades.get(label).map(|g| g.to_string()).unwrap_or_default();
                line.push(pad(&cell, label.chars().count()));
            }
            println!("{}", line.join(" | "));
        }
    }

    let mut diagnostics = load_diagnostics.to_vec();
    diagnostics.extend(aggregation.diagnostics.iter().cloned());
    diagnostics.sort();
    print_diagnostics(&diagnostics);
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }

    println!();
    println!("{}", "Diagnostics:".bold().underline());
    for diagnostic in diagnostics {
        let severity_str = match diagnostic.severity {
            Severity::Error => "ERROR".red().bold(),
            Severity::Warning => "WARN".yellow().bold(),
            Severity::Info => "INFO".blue().bold(),
        };
        println!(
            "  {} [{}] {}: {}",
            severity_str,
            diagnostic.kind.as_str().bright_black(),
            diagnostic.subject,
            diagnostic.message
        );
    }

    let errors = count_severity(diagnostics, Severity::Error);
    let warnings = count_severity(diagnostics, Severity::Warning);
    if errors > 0 {
        println!("  {} {}", "Errors:".red().bold(), errors);
    }
    if warnings > 0 {
        println!("  {} {}", "Warnings:".yellow().bold(), warnings);
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

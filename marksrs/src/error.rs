//! Error types for loading and aggregating grade reports.

use std::path::PathBuf;
use thiserror::Error;

/// A single dataset could not be turned into a table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be opened as a spreadsheet.
    #[error("failed to open workbook {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    /// A page of the workbook could not be read.
    #[error("failed to read sheet '{sheet}' in {path}: {source}")]
    Sheet {
        path: PathBuf,
        sheet: String,
        #[source]
        source: calamine::Error,
    },

    /// No workbook is known for this path.
    #[error("workbook not found: {path}")]
    NotFound { path: PathBuf },

    /// The workbook has no pages at all.
    #[error("workbook has no sheets: {path}")]
    NoSheets { path: PathBuf },

    /// The summary page ends before its header row.
    #[error("sheet '{sheet}' in {path} has no header at row {row}")]
    MissingHeader {
        path: PathBuf,
        sheet: String,
        row: u32,
    },
}

impl LoadError {
    /// Path of the source that failed
    pub fn path(&self) -> &PathBuf {
        match self {
            LoadError::Open { path, .. }
            | LoadError::Sheet { path, .. }
            | LoadError::NotFound { path }
            | LoadError::NoSheets { path }
            | LoadError::MissingHeader { path, .. } => path,
        }
    }
}

/// The catalog could not be built at all.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Aggregation was refused.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// Two datasets normalize to the same column label.
    #[error("column label '{label}' is shared by {first} and {second}")]
    Collision {
        label: String,
        first: String,
        second: String,
    },
}

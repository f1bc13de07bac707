//! Module tables: one row per student, columns addressed by name

use crate::error::LoadError;
use crate::reader::{CellValue, Sheet};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Row of the header in a summary page; rows above it are report metadata
pub const DEFAULT_HEADER_ROW: u32 = 4;

/// Student rows of a module's summary page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    /// File the table was read from
    pub source: PathBuf,
    /// Page the table was read from
    pub sheet: String,
    /// Unique column names, in sheet order
    pub columns: Vec<String>,
    /// Data rows, each exactly `columns.len()` wide
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Build a table from in-memory columns and rows. Short rows are padded.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let columns = unique_column_names(columns);
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self {
            source: PathBuf::new(),
            sheet: String::new(),
            columns,
            rows,
        }
    }

    /// Read the table out of a page: header at `header_row`, data below it.
    ///
    /// Rows where every cell is empty are dropped.
    pub fn from_sheet(
        sheet: &Sheet,
        header_row: u32,
        source: impl Into<PathBuf>,
    ) -> Result<Self, LoadError> {
        let source = source.into();
        let missing_header = || LoadError::MissingHeader {
            path: source.clone(),
            sheet: sheet.name.clone(),
            row: header_row,
        };

        let (max_row, _) = sheet.last_data_cell().ok_or_else(missing_header)?;
        if max_row < header_row {
            return Err(missing_header());
        }

        let width = sheet
            .cells
            .values()
            .filter(|c| c.row >= header_row)
            .map(|c| c.col + 1)
            .max()
            .unwrap_or(0);

        let header: Vec<String> = (0..width)
            .map(|col| match sheet.value(header_row, col) {
                CellValue::Empty => format!("Unnamed: {}", col),
                value => value.to_string().trim().to_string(),
            })
            .collect();

        let mut rows = Vec::new();
        for row in (header_row + 1)..=max_row {
            let values: Vec<CellValue> = (0..width).map(|col| sheet.value(row, col)).collect();
            if values.iter().all(CellValue::is_empty) {
                continue;
            }
            rows.push(values);
        }

        Ok(Self {
            source,
            sheet: sheet.name.clone(),
            ..Self::new(header, rows)
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value at `(row, col)`; `Empty` outside the table
    pub fn value(&self, row: usize, col: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Value of a named column in a row
    pub fn get(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.column_index(column).map(|col| self.value(row, col))
    }

    /// `"{first} {last}"` from the first two columns, `None` when both are empty
    pub fn student_name(&self, row: usize) -> Option<String> {
        let first = self.value(row, 0);
        let last = self.value(row, 1);
        if first.is_empty() && last.is_empty() {
            return None;
        }
        Some(format!("{} {}", first, last))
    }

    /// Rows of a student, by the same key as [`Table::student_name`]
    pub fn rows_for_student<'a>(&'a self, name: &'a str) -> impl Iterator<Item = usize> + 'a {
        (0..self.rows.len()).filter(move |&row| self.student_name(row).as_deref() == Some(name))
    }
}

/// Suffix repeated names with `.1`, `.2`, ... so every column is addressable
fn unique_column_names(columns: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut result = Vec::with_capacity(columns.len());
    for name in columns {
        let mut candidate = name.clone();
        while let Some(count) = seen.get_mut(&candidate) {
            *count += 1;
            candidate = format!("{}.{}", name, count);
        }
        seen.insert(candidate.clone(), 0);
        result.push(candidate);
    }
    result
}

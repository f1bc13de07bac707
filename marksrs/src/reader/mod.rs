//! Excel/ODS file reader using calamine

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
use std::cell::Cell as Counter;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub mod workbook;

use crate::error::LoadError;
pub use workbook::{Cell, CellValue, Sheet, Workbook};

/// Source of workbooks, keyed by path
pub trait WorkbookSource {
    fn read(&self, path: &Path) -> Result<Workbook, LoadError>;
}

/// Reads spreadsheet files from disk with calamine
#[derive(Debug, Clone, Copy, Default)]
pub struct CalamineSource;

impl WorkbookSource for CalamineSource {
    fn read(&self, path: &Path) -> Result<Workbook, LoadError> {
        read_workbook(path)
    }
}

/// Workbooks held in memory, for embedding callers and tests.
///
/// Counts every read so memoization can be observed.
#[derive(Debug, Default)]
pub struct MemorySource {
    workbooks: HashMap<PathBuf, Workbook>,
    reads: Counter<usize>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, workbook: Workbook) {
        let path = path.into();
        let workbook = Workbook {
            path: path.clone(),
            ..workbook
        };
        self.workbooks.insert(path, workbook);
    }

    /// Number of reads served so far, failed ones included
    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl WorkbookSource for MemorySource {
    fn read(&self, path: &Path) -> Result<Workbook, LoadError> {
        self.reads.set(self.reads.get() + 1);
        self.workbooks
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::NotFound {
                path: path.to_path_buf(),
            })
    }
}

/// Read a workbook from a file path, every page included
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook, LoadError> {
    let path = path.as_ref();
    let mut excel: Sheets<_> = open_workbook_auto(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut sheets = Vec::new();
    for sheet_name in excel.sheet_names() {
        let range = excel
            .worksheet_range(&sheet_name)
            .map_err(|source| LoadError::Sheet {
                path: path.to_path_buf(),
                sheet: sheet_name.clone(),
                source,
            })?;
        sheets.push(parse_sheet(&sheet_name, &range));
    }

    Ok(Workbook {
        path: path.to_path_buf(),
        sheets,
    })
}

fn parse_sheet(name: &str, range: &Range<Data>) -> Sheet {
    let mut sheet = Sheet::new(name);

    // calamine ranges start at the first used cell; cells are stored with
    // absolute sheet coordinates so fixed header offsets stay meaningful
    let Some((start_row, start_col)) = range.start() else {
        return sheet;
    };

    for (rel_row, rel_col, data) in range.cells() {
        let value = parse_cell_value(data);
        if !value.is_empty() {
            sheet.set(start_row + rel_row as u32, start_col + rel_col as u32, value);
        }
    }

    sheet
}

fn parse_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Error(e) => CellValue::Error(format!("{:?}", e)),
        Data::Empty => CellValue::Empty,
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

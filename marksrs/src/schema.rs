//! Column lookup by name with a fallback schema

use crate::table::Table;

/// Outcome of looking up a column that has an alternate name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnResolution {
    /// The primary column, at this index
    Found(usize),
    /// The primary column is absent; the fallback is at this index
    FallbackUsed(usize),
    Missing,
}

impl ColumnResolution {
    pub fn index(&self) -> Option<usize> {
        match self {
            ColumnResolution::Found(i) | ColumnResolution::FallbackUsed(i) => Some(*i),
            ColumnResolution::Missing => None,
        }
    }
}

/// Resolve `primary`, then `fallback`, against the columns of a table
pub fn resolve_column(table: &Table, primary: &str, fallback: &str) -> ColumnResolution {
    if let Some(i) = table.column_index(primary) {
        ColumnResolution::Found(i)
    } else if let Some(i) = table.column_index(fallback) {
        ColumnResolution::FallbackUsed(i)
    } else {
        ColumnResolution::Missing
    }
}

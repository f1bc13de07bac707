//! Dataset loading with an explicit memoization table

use crate::error::LoadError;
use crate::reader::{CalamineSource, WorkbookSource};
use crate::table::{DEFAULT_HEADER_ROW, Table};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Tables already loaded in this session, keyed by path and header row.
///
/// Nothing is ever evicted; the files are not expected to change while the
/// process runs. Call [`TableCache::clear`] to force a reload.
#[derive(Debug, Default)]
pub struct TableCache {
    tables: HashMap<(PathBuf, u32), Arc<Table>>,
    hits: usize,
    misses: usize,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, path: &Path, header_row: u32) -> Option<Arc<Table>> {
        match self.tables.get(&(path.to_path_buf(), header_row)) {
            Some(table) => {
                self.hits += 1;
                Some(Arc::clone(table))
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, path: PathBuf, header_row: u32, table: Arc<Table>) {
        self.tables.insert((path, header_row), table);
    }

    pub fn contains(&self, path: &Path, header_row: u32) -> bool {
        self.tables.contains_key(&(path.to_path_buf(), header_row))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn clear(&mut self) {
        self.tables.clear();
    }
}

/// Loads the summary table of a workbook, once per path
#[derive(Debug)]
pub struct DatasetLoader<S = CalamineSource> {
    source: S,
    cache: TableCache,
    header_row: u32,
}

impl DatasetLoader<CalamineSource> {
    /// Loader reading files from disk
    pub fn new() -> Self {
        Self::with_source(CalamineSource)
    }
}

impl Default for DatasetLoader<CalamineSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: WorkbookSource> DatasetLoader<S> {
    pub fn with_source(source: S) -> Self {
        Self::with_cache(source, TableCache::new())
    }

    /// Loader sharing a cache built elsewhere
    pub fn with_cache(source: S, cache: TableCache) -> Self {
        Self {
            source,
            cache,
            header_row: DEFAULT_HEADER_ROW,
        }
    }

    pub fn header_row(mut self, header_row: u32) -> Self {
        self.header_row = header_row;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &TableCache {
        &self.cache
    }

    /// Give the cache back, e.g. to reuse it in a later loader
    pub fn into_cache(self) -> TableCache {
        self.cache
    }

    /// Load the table held by the last page of the workbook at `path`.
    ///
    /// Earlier pages hold per-course detail and are ignored. Successful loads
    /// are cached; failures are not.
    pub fn load(&mut self, path: &Path) -> Result<Arc<Table>, LoadError> {
        if let Some(table) = self.cache.get(path, self.header_row) {
            debug!(path = %path.display(), "table served from cache");
            return Ok(table);
        }

        debug!(path = %path.display(), "loading data");
        let workbook = self.source.read(path)?;
        let sheet = workbook.last_sheet().ok_or_else(|| LoadError::NoSheets {
            path: path.to_path_buf(),
        })?;
        let table = Arc::new(Table::from_sheet(sheet, self.header_row, path)?);
        debug!(
            path = %path.display(),
            sheet = %sheet.name,
            rows = table.len(),
            columns = table.columns.len(),
            "table loaded"
        );

        self.cache
            .insert(path.to_path_buf(), self.header_row, Arc::clone(&table));
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{CellValue, MemorySource, Sheet, Workbook};

    fn workbook() -> Workbook {
        let detail = Sheet::from_rows("Algo", vec![vec!["detail".into()]]);
        let mut summary = Sheet::new("Résumé");
        summary.set(4, 0, "Prenom".into());
        summary.set(4, 1, "Nom".into());
        summary.set(4, 2, "Note du module".into());
        summary.set(5, 0, "Alice".into());
        summary.set(5, 1, "Martin".into());
        summary.set(5, 2, CellValue::Number(5.0));
        Workbook {
            sheets: vec![detail, summary],
            ..Default::default()
        }
    }

    #[test]
    fn test_load_uses_last_sheet() {
        let mut source = MemorySource::new();
        source.insert("205 Algo 2024-2025.xlsx", workbook());
        let mut loader = DatasetLoader::with_source(source);

        let table = loader.load(Path::new("205 Algo 2024-2025.xlsx")).unwrap();
        assert_eq!(table.sheet, "Résumé");
        assert_eq!(table.columns, vec!["Prenom", "Nom", "Note du module"]);
        assert_eq!(table.source, PathBuf::from("205 Algo 2024-2025.xlsx"));
    }

    #[test]
    fn test_load_is_memoized() {
        let mut source = MemorySource::new();
        source.insert("a.xlsx", workbook());
        let mut loader = DatasetLoader::with_source(source);

        let first = loader.load(Path::new("a.xlsx")).unwrap();
        let second = loader.load(Path::new("a.xlsx")).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
        assert_eq!(loader.source().reads(), 1);
        assert_eq!(loader.cache().hits(), 1);
        assert_eq!(loader.cache().misses(), 1);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let mut loader = DatasetLoader::with_source(MemorySource::new());

        assert!(loader.load(Path::new("a.xlsx")).is_err());
        assert!(loader.load(Path::new("a.xlsx")).is_err());
        assert_eq!(loader.source().reads(), 2);
        assert!(loader.cache().is_empty());
    }

    #[test]
    fn test_workbook_without_sheets() {
        let mut source = MemorySource::new();
        source.insert("empty.xlsx", Workbook::default());
        let mut loader = DatasetLoader::with_source(source);

        let err = loader.load(Path::new("empty.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::NoSheets { .. }));
    }

    #[test]
    fn test_cache_can_be_handed_over() {
        let mut source = MemorySource::new();
        source.insert("a.xlsx", workbook());
        let mut loader = DatasetLoader::with_source(source);
        loader.load(Path::new("a.xlsx")).unwrap();

        let cache = loader.into_cache();
        assert!(cache.contains(Path::new("a.xlsx"), DEFAULT_HEADER_ROW));

        // A new loader with the old cache never reaches its (empty) source
        let mut reloaded = DatasetLoader::with_cache(MemorySource::new(), cache);
        assert!(reloaded.load(Path::new("a.xlsx")).is_ok());
        assert_eq!(reloaded.source().reads(), 0);
    }

    #[test]
    fn test_cache_is_per_header_row() {
        let mut source = MemorySource::new();
        source.insert("a.xlsx", workbook());
        let mut loader = DatasetLoader::with_source(source);
        loader.load(Path::new("a.xlsx")).unwrap();

        let mut source = MemorySource::new();
        source.insert("a.xlsx", workbook());
        let mut shifted = DatasetLoader::with_cache(source, loader.into_cache()).header_row(5);
        let table = shifted.load(Path::new("a.xlsx")).unwrap();

        // Row 5 holds Alice's line, read as a header this time
        assert_eq!(table.columns, vec!["Alice", "Martin", "5"]);
        assert!(table.is_empty());
        assert_eq!(shifted.source().reads(), 1);
        assert_eq!(shifted.cache().len(), 2);
    }
}

//! The set of module tables found in a data directory

use crate::config::MarksConfig;
use crate::diagnostics::Diagnostic;
use crate::error::CatalogError;
use crate::key::{DatasetKey, extract_key};
use crate::level::LevelFilter;
use crate::loader::DatasetLoader;
use crate::reader::WorkbookSource;
use crate::table::Table;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which directory entries are datasets
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    /// Extensions without the dot, compared case-insensitively
    pub extensions: Vec<String>,
    /// Lock files left by spreadsheet editors start with this
    pub temp_prefix: String,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self::from(&MarksConfig::default())
    }
}

impl From<&MarksConfig> for CatalogOptions {
    fn from(config: &MarksConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            temp_prefix: config.temp_prefix.clone(),
        }
    }
}

impl CatalogOptions {
    /// Whether a file name is a dataset candidate
    pub fn accepts(&self, file_name: &str) -> bool {
        if file_name.starts_with(&self.temp_prefix) {
            return false;
        }
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

/// An entry of the module browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleChoice {
    /// `"{code} {name}"`
    pub display_name: String,
    pub file_name: String,
    pub key: DatasetKey,
}

/// All module tables of a data directory with their keys
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: BTreeMap<String, Arc<Table>>,
    keys: BTreeMap<String, DatasetKey>,
    diagnostics: Vec<Diagnostic>,
    /// Directory entries that were not dataset candidates
    skipped: usize,
}

impl Catalog {
    /// Load every dataset in `directory`.
    ///
    /// Files that fail to load are skipped and files whose name has no key
    /// are kept but not selectable; both are logged and recorded in
    /// [`Catalog::diagnostics`]. Only an unreadable directory is an error.
    pub fn load<S: WorkbookSource>(
        directory: &Path,
        loader: &mut DatasetLoader<S>,
        options: &CatalogOptions,
    ) -> Result<Self, CatalogError> {
        let entries = std::fs::read_dir(directory).map_err(|e| CatalogError::DirectoryRead {
            path: directory.to_path_buf(),
            source: e,
        })?;

        let mut file_names = Vec::new();
        let mut skipped = 0;
        for entry_result in entries {
            let entry = entry_result.map_err(|e| CatalogError::DirectoryRead {
                path: directory.to_path_buf(),
                source: e,
            })?;

            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !entry.path().is_file() {
                debug!(entry = %file_name, "not a file, skipped");
                skipped += 1;
            } else if options.accepts(&file_name) {
                file_names.push(file_name);
            } else {
                debug!(file = %file_name, "not a dataset, skipped");
                skipped += 1;
            }
        }
        file_names.sort();

        let mut tables = BTreeMap::new();
        let mut diagnostics = Vec::new();
        for file_name in file_names {
            match loader.load(&directory.join(&file_name)) {
                Ok(table) => {
                    tables.insert(file_name, table);
                }
                Err(e) => {
                    warn!(file = %file_name, error = %e, "dataset skipped");
                    diagnostics.push(Diagnostic::load(&file_name, e.to_string()));
                }
            }
        }

        let mut catalog = Self::build(tables, diagnostics);
        catalog.skipped = skipped;
        info!(
            directory = %directory.display(),
            tables = catalog.len(),
            identified = catalog.keys.len(),
            skipped,
            "catalog loaded"
        );
        catalog.diagnostics.sort();
        Ok(catalog)
    }

    /// Catalog over tables already in memory, keyed by file name
    pub fn from_parts<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = (String, Table)>,
    {
        let tables = tables
            .into_iter()
            .map(|(name, table)| (name, Arc::new(table)))
            .collect();
        Self::build(tables, Vec::new())
    }

    fn build(tables: BTreeMap<String, Arc<Table>>, mut diagnostics: Vec<Diagnostic>) -> Self {
        let mut keys = BTreeMap::new();
        for file_name in tables.keys() {
            match extract_key(file_name) {
                Some(key) => {
                    keys.insert(file_name.clone(), key);
                }
                None => {
                    warn!(file = %file_name, "no module key in file name");
                    diagnostics.push(Diagnostic::parse(
                        file_name,
                        "no module code and academic year in file name; not selectable by module",
                    ));
                }
            }
        }
        Self {
            tables,
            keys,
            diagnostics,
            skipped: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn table(&self, file_name: &str) -> Option<&Table> {
        self.tables.get(file_name).map(Arc::as_ref)
    }

    pub fn key(&self, file_name: &str) -> Option<&DatasetKey> {
        self.keys.get(file_name)
    }

    /// Tables by file name, in file name order
    pub fn tables(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Keys by file name, for files that have one
    pub fn keys(&self) -> &BTreeMap<String, DatasetKey> {
        &self.keys
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of directory entries left out before loading: lock files,
    /// other extensions and anything that is not a regular file
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Identified tables whose module code matches the filter
    pub fn select<'a>(
        &'a self,
        levels: &'a LevelFilter,
    ) -> impl Iterator<Item = (&'a str, &'a DatasetKey, &'a Table)> + 'a {
        self.keys.iter().filter_map(move |(file_name, key)| {
            if !levels.matches(&key.module_code) {
                return None;
            }
            let table = self.tables.get(file_name)?;
            Some((file_name.as_str(), key, table.as_ref()))
        })
    }

    /// Entries of the module browser for the given levels, sorted by display
    /// name with duplicates removed
    pub fn module_choices(&self, levels: &LevelFilter) -> Vec<ModuleChoice> {
        let mut seen = BTreeSet::new();
        let mut choices: Vec<ModuleChoice> = self
            .select(levels)
            .map(|(file_name, key, _)| ModuleChoice {
                display_name: key.display_name(),
                file_name: file_name.to_string(),
                key: key.clone(),
            })
            .collect();
        choices.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        choices.retain(|c| seen.insert(c.display_name.clone()));
        choices
    }

    /// First table, in file name order, whose display name matches
    pub fn find_module(&self, display_name: &str) -> Option<(&str, &Table)> {
        self.keys
            .iter()
            .find(|(_, key)| key.display_name() == display_name)
            .and_then(|(file_name, _)| {
                self.table(file_name)
                    .map(|table| (file_name.as_str(), table))
            })
    }

    /// Every student across all tables, sorted and unique
    pub fn student_names(&self) -> Vec<String> {
        let names: BTreeSet<String> = self
            .tables
            .values()
            .flat_map(|table| (0..table.len()).filter_map(move |row| table.student_name(row)))
            .collect();
        names.into_iter().collect()
    }
}

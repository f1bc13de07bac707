//! marksrs: Core library for browsing student grade reports
//!
//! Loads one spreadsheet per module and academic year from a directory, keys
//! each by the module code, name and year found in its file name, and pivots
//! them into student-by-module matrices per cohort level.

pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod key;
pub mod level;
pub mod loader;
pub mod reader;
pub mod schema;
pub mod student;
pub mod table;

pub use aggregate::{AggregateOptions, Aggregation, aggregate};
pub use catalog::{Catalog, CatalogOptions, ModuleChoice};
pub use config::{CollisionPolicy, ColumnsConfig, MarksConfig};
pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use error::{AggregateError, CatalogError, LoadError};
pub use key::{DatasetKey, extract_key, normalize_label};
pub use level::LevelFilter;
pub use loader::{DatasetLoader, TableCache};
pub use reader::CellValue;
pub use student::{ModuleStatus, StudentReport, student_report};
pub use table::Table;

use std::path::Path;

/// Catalog and loader configured together
pub struct Marks {
    config: MarksConfig,
    loader: DatasetLoader,
}

impl Marks {
    /// Create with default configuration
    pub fn new() -> Self {
        Self::with_config(MarksConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(config: MarksConfig) -> Self {
        let loader = DatasetLoader::new().header_row(config.header_row);
        Self { config, loader }
    }

    pub fn config(&self) -> &MarksConfig {
        &self.config
    }

    /// Load the configured data directory
    pub fn load_catalog(&mut self) -> Result<Catalog, CatalogError> {
        let directory = self.config.data_dir.clone();
        self.load_catalog_from(&directory)
    }

    /// Load another directory with the same settings and cache
    pub fn load_catalog_from(&mut self, directory: &Path) -> Result<Catalog, CatalogError> {
        Catalog::load(directory, &mut self.loader, &CatalogOptions::from(&self.config))
    }

    /// Matrix of final grades for the given levels
    pub fn aggregate(
        &self,
        catalog: &Catalog,
        levels: &LevelFilter,
    ) -> Result<Aggregation, AggregateError> {
        aggregate(catalog, levels, &AggregateOptions::from(&self.config))
    }

    /// All modules of one student
    pub fn student(&self, catalog: &Catalog, name: &str) -> StudentReport {
        student_report(catalog, name, &self.config.columns)
    }
}

impl Default for Marks {
    fn default() -> Self {
        Self::new()
    }
}

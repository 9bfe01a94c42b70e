//! Table descriptor loading.
//!
//! Provides [`TableCatalog`], the ordered set of [`TableSchema`]s an
//! application manages, loaded from a directory of per-table files, a
//! single [`TablePackage`] file, or both as named by a [`GatewayConfig`].
//!
//! # Loading patterns
//!
//! ```no_run
//! use rowgate_db::TableCatalog;
//!
//! // One descriptor per file: tables/orders.yml, tables/customers.json, ...
//! let catalog = TableCatalog::from_dir("tables/").unwrap();
//! assert!(catalog.get("orders").is_some());
//!
//! // Every descriptor in one package file
//! let catalog = TableCatalog::from_package("shop.yml").unwrap();
//! ```
//!
//! Descriptor files may be JSON (`.json`) or YAML (`.yaml`, `.yml`).

use std::path::{Path, PathBuf};

use rowgate_core::{TablePackage, TableSchema};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::GatewayConfig;
use crate::error::{ConfigError, Result};

/// Describes where a [`TableCatalog`] was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogSource {
    /// Built in code.
    Inline,
    /// Loaded from a directory of per-table files.
    Directory(PathBuf),
    /// Loaded from a single [`TablePackage`] file.
    Package(PathBuf),
    /// Merged from several sources.
    Multiple(Vec<CatalogSource>),
}

/// Ordered collection of table descriptors.
///
/// Registration order is the load order: files in a directory are read
/// sorted by file name, package tables keep their declared order.
///
/// # Examples
///
/// ```
/// use rowgate_core::{ColumnDef, TableSchema};
/// use rowgate_db::TableCatalog;
///
/// let catalog = TableCatalog::from_tables(vec![
///     TableSchema::new("orders").with_column(ColumnDef::integer("id")),
/// ])
/// .unwrap();
/// assert_eq!(catalog.names(), vec!["orders"]);
/// ```
#[derive(Debug, Clone)]
pub struct TableCatalog {
    tables: Vec<TableSchema>,
    source: CatalogSource,
}

impl TableCatalog {
    /// Builds a catalog from descriptors constructed in code.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateTable`] if two descriptors share a name.
    pub fn from_tables(tables: Vec<TableSchema>) -> Result<Self> {
        let mut catalog = Self {
            tables: Vec::with_capacity(tables.len()),
            source: CatalogSource::Inline,
        };
        for table in tables {
            catalog.push(table)?;
        }
        Ok(catalog)
    }

    /// Loads every `*.json`, `*.yaml` and `*.yml` file in `path`.
    ///
    /// Each file holds one [`TableSchema`]. Other files are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if the directory cannot be read,
    /// [`ConfigError::InvalidTableFile`] if a file does not parse, or
    /// [`ConfigError::DuplicateTable`] if two files declare the same table.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut files = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let file_path = entry?.path();
            if file_path.is_file() && descriptor_format(&file_path).is_some() {
                files.push(file_path);
            }
        }
        files.sort();

        let mut catalog = Self {
            tables: Vec::with_capacity(files.len()),
            source: CatalogSource::Directory(path.to_path_buf()),
        };
        for file_path in files {
            let table: TableSchema = read_descriptor(&file_path)?;
            debug!(table = %table.name, file = %file_path.display(), "loaded table descriptor");
            catalog.push(table)?;
        }
        Ok(catalog)
    }

    /// Loads a single [`TablePackage`] file (JSON or YAML).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedFormat`] for unknown extensions,
    /// [`ConfigError::InvalidTableFile`] if the file does not parse, or
    /// [`ConfigError::DuplicateTable`] if the package repeats a table.
    pub fn from_package(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let package: TablePackage = read_descriptor(path)?;
        debug!(
            package = package.name.as_deref().unwrap_or("-"),
            tables = package.table_count(),
            "loaded table package"
        );

        let mut catalog = Self {
            tables: Vec::with_capacity(package.table_count()),
            source: CatalogSource::Package(path.to_path_buf()),
        };
        for table in package.tables {
            catalog.push(table)?;
        }
        Ok(catalog)
    }

    /// Loads the directory and/or package named by `config`.
    ///
    /// When both are configured the directory's tables come first.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoTableSources`] if neither is configured, or
    /// any error from [`from_dir`](Self::from_dir) and
    /// [`from_package`](Self::from_package).
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let mut loaded = Vec::new();
        if let Some(dir) = &config.tables_dir {
            loaded.push(Self::from_dir(dir)?);
        }
        if let Some(package) = &config.package {
            loaded.push(Self::from_package(package)?);
        }

        match loaded.len() {
            0 => Err(ConfigError::NoTableSources),
            1 => Ok(loaded.remove(0)),
            _ => {
                let mut catalog = Self {
                    tables: Vec::new(),
                    source: CatalogSource::Multiple(
                        loaded.iter().map(|c| c.source.clone()).collect(),
                    ),
                };
                for table in loaded.into_iter().flat_map(|c| c.tables) {
                    catalog.push(table)?;
                }
                Ok(catalog)
            }
        }
    }

    fn push(&mut self, table: TableSchema) -> Result<()> {
        if self.contains(&table.name) {
            return Err(ConfigError::DuplicateTable(table.name));
        }
        self.tables.push(table);
        Ok(())
    }

    /// Looks up a descriptor by table name.
    pub fn get(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|table| table.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Descriptors in registration order.
    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    /// Table names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tables.iter().map(|table| table.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    /// Consumes the catalog, returning its descriptors.
    pub fn into_tables(self) -> Vec<TableSchema> {
        self.tables
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DescriptorFormat {
    Json,
    Yaml,
}

fn descriptor_format(path: &Path) -> Option<DescriptorFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Some(DescriptorFormat::Json),
        Some("yaml" | "yml") => Some(DescriptorFormat::Yaml),
        _ => None,
    }
}

fn read_descriptor<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format =
        descriptor_format(path).ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let parsed = match format {
        DescriptorFormat::Json => serde_json::from_reader(reader).map_err(|e| e.to_string()),
        DescriptorFormat::Yaml => serde_yaml::from_reader(reader).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| ConfigError::InvalidTableFile {
        path: path.to_path_buf(),
        message,
    })
}

//! Gateway configuration.
//!
//! Defines the YAML-serializable settings a host application (or the
//! `rowgate` CLI) uses to open a database, pick the table-level locale and
//! find its table descriptors.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! database: app.db
//! locale:
//!   charset: utf8mb4
//!   collation: utf8mb4_unicode_ci
//! tables_dir: tables/
//! busy_timeout_ms: 5000
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default busy timeout applied to opened connections.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Table-level character set and collation.
///
/// Only drivers that understand table-level locale clauses use these
/// values; SQLite ignores them.
///
/// # Examples
///
/// ```
/// # use rowgate_db::LocaleConfig;
/// let locale = LocaleConfig::new(Some("utf8mb4"), None);
/// assert!(!locale.is_empty());
/// assert!(LocaleConfig::default().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleConfig {
    /// Default character set, e.g. `utf8mb4`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    /// Default collation, e.g. `utf8mb4_unicode_ci`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
}

impl LocaleConfig {
    pub fn new(charset: Option<&str>, collation: Option<&str>) -> Self {
        Self {
            charset: charset.map(String::from),
            collation: collation.map(String::from),
        }
    }

    /// Returns `true` when neither a character set nor a collation is set.
    pub fn is_empty(&self) -> bool {
        let blank = |value: &Option<String>| value.as_deref().is_none_or(|v| v.trim().is_empty());
        blank(&self.charset) && blank(&self.collation)
    }
}

/// Top-level gateway configuration.
///
/// # Examples
///
/// ```no_run
/// use rowgate_db::GatewayConfig;
///
/// let config = GatewayConfig::load("rowgate.yml").unwrap();
/// println!("database: {:?}", config.database);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Configuration format version (e.g., `"1.0"`).
    #[serde(default = "default_version")]
    pub version: String,
    /// Database file. `None` opens an in-memory database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
    /// Table-level locale used when generating DDL.
    #[serde(default)]
    pub locale: LocaleConfig,
    /// Directory of per-table descriptor files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables_dir: Option<PathBuf>,
    /// A single package file declaring several tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<PathBuf>,
    /// How long a connection waits on a locked database.
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_busy_timeout() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            database: None,
            locale: LocaleConfig::default(),
            tables_dir: None,
            package: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl GatewayConfig {
    /// Loads configuration from a YAML file.
    ///
    /// Relative `database`, `tables_dir` and `package` paths are resolved
    /// against the directory containing the configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ConfigError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::ConfigError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config: Self = serde_yaml::from_reader(reader)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.resolve_paths(base))
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ConfigError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::ConfigError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Joins relative paths onto `base`.
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        let resolve = |path: Option<PathBuf>| {
            path.map(|p| if p.is_relative() { base.join(p) } else { p })
        };
        self.database = resolve(self.database.take());
        self.tables_dir = resolve(self.tables_dir.take());
        self.package = resolve(self.package.take());
        self
    }

    /// Returns `true` if at least one descriptor source is configured.
    pub fn has_table_sources(&self) -> bool {
        self.tables_dir.is_some() || self.package.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
version: "1.0"
database: app.db
locale:
  charset: utf8mb4
  collation: utf8mb4_unicode_ci
tables_dir: tables/
busy_timeout_ms: 250
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: GatewayConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.database, Some(PathBuf::from("app.db")));
        assert_eq!(config.locale.charset.as_deref(), Some("utf8mb4"));
        assert_eq!(
            config.locale.collation.as_deref(),
            Some("utf8mb4_unicode_ci")
        );
        assert_eq!(config.tables_dir, Some(PathBuf::from("tables/")));
        assert_eq!(config.busy_timeout_ms, 250);
        assert!(config.package.is_none());
    }

    #[test]
    fn test_deserialize_minimal() {
        let config: GatewayConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, GatewayConfig::default());
        assert!(config.locale.is_empty());
        assert!(!config.has_table_sources());
    }

    #[test]
    fn test_blank_locale_is_empty() {
        let locale = LocaleConfig::new(Some("  "), None);
        assert!(locale.is_empty());
        assert!(!LocaleConfig::new(None, Some("nocase")).is_empty());
    }

    #[test]
    fn test_resolve_paths() {
        let config = GatewayConfig {
            database: Some("app.db".into()),
            package: Some("/abs/package.yml".into()),
            ..GatewayConfig::default()
        }
        .resolve_paths(Path::new("/etc/rowgate"));
        assert_eq!(config.database, Some(PathBuf::from("/etc/rowgate/app.db")));
        assert_eq!(config.package, Some(PathBuf::from("/abs/package.yml")));
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rowgate.yml");

        let original: GatewayConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();

        let loaded = GatewayConfig::load(&path).unwrap();
        assert_eq!(loaded.locale, original.locale);
        assert_eq!(loaded.busy_timeout_ms, original.busy_timeout_ms);
        assert_eq!(loaded.database, Some(dir.path().join("app.db")));
        assert_eq!(loaded.tables_dir, Some(dir.path().join("tables/")));
    }
}

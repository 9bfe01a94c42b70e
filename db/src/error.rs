//! Error types for configuration and catalog loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading configuration or table descriptors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File system I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML deserialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A descriptor file could not be parsed.
    #[error("invalid table file {path}: {message}")]
    InvalidTableFile { path: PathBuf, message: String },

    /// A descriptor file has an extension other than json, yaml or yml.
    #[error("unsupported table file format: {0}")]
    UnsupportedFormat(PathBuf),

    /// Two descriptor sources declare the same table.
    #[error("table {0} is declared more than once")]
    DuplicateTable(String),

    /// Neither a tables directory nor a package file is configured.
    #[error("no table sources configured")]
    NoTableSources,
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;

//! Configuration and table catalog loading for rowgate.
//!
//! This crate provides the file-backed pieces a host application needs
//! before it can open a gateway: [`GatewayConfig`] (where the database
//! lives, which table-level locale to use, where descriptors are kept) and
//! [`TableCatalog`] (the descriptors themselves, loaded from JSON or YAML).
//!
//! # Quick start
//!
//! ```no_run
//! use rowgate_db::{GatewayConfig, TableCatalog};
//!
//! let config = GatewayConfig::load("rowgate.yml").unwrap();
//! let catalog = TableCatalog::from_config(&config).unwrap();
//! for name in catalog.names() {
//!     println!("managed table: {name}");
//! }
//! ```

mod config;
mod error;
mod loader;

pub use config::{DEFAULT_BUSY_TIMEOUT_MS, GatewayConfig, LocaleConfig};
pub use error::{ConfigError, Result};
pub use loader::{CatalogSource, TableCatalog};

//! Core descriptor types and write-payload primitives for rowgate.
//!
//! This crate defines everything a table gateway needs that does not touch a
//! database connection:
//!
//! - [`TableSchema`] — per-table descriptor (name, primary key, version tag,
//!   whitelisted [`ColumnDef`]s with bind formats and defaults).
//! - [`Row`] / [`Value`] — ordered column/value payloads as read and written.
//! - [`merge_defaults`] and [`TableSchema::filter`] — defaults overlay and
//!   whitelist filtering with key canonicalisation.
//! - [`BindSequence`] — single-pass positional binds for a statement.
//! - [`TablePackage`] — a versioned bundle of descriptors.
//!
//! Validation ([`validate_table`], [`validate_package`]) catches structural
//! errors such as bad identifiers, duplicate columns and undeclared primary
//! keys.
//!
//! # Example
//!
//! ```
//! use rowgate_core::*;
//!
//! let orders = TableSchema::new("orders")
//!     .with_column(ColumnDef::integer("id").not_null().auto_increment())
//!     .with_column(ColumnDef::text("customer").not_null())
//!     .with_column(ColumnDef::real("total"))
//!     .with_column(ColumnDef::text("status").with_default("pending"));
//! assert!(validate_table(&orders).is_empty());
//!
//! let data = Row::new().with("customer", "alice").with("total", 9.99);
//! let payload = orders.filter(&merge_defaults(&orders.defaults(), &data));
//! let binds = BindSequence::build(&orders, &payload);
//!
//! assert_eq!(binds.columns(), vec!["status", "customer", "total"]);
//! ```

mod bind;
mod merge;
mod package;
mod types;
mod validate;

pub use bind::{Bind, BindSequence};
pub use merge::merge_defaults;
pub use package::TablePackage;
pub use types::*;
pub use validate::{
    ValidationError, is_canonical_identifier, is_valid_identifier, validate_package,
    validate_table,
};

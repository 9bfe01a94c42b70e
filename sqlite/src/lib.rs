//! SQLite-backed table gateway and idempotent schema manager.
//!
//! This crate connects the descriptors from [`rowgate_core`] to a live
//! database through the [`Driver`] seam, implemented for
//! [`rusqlite::Connection`].
//!
//! # Architecture
//!
//! The crate is organized into six modules:
//!
//! - **`driver`** — the [`Driver`] trait, identifier quoting and [`open`]
//! - **`schema`** — DDL generation ([`DdlStatement`], [`LocaleClause`])
//! - **`converge`** — additive, idempotent apply ([`SqliteConverger`])
//! - **`manager`** — table registration ([`SchemaManager`])
//! - **`gateway`** — per-table row access ([`TableGateway`])
//! - **`notify`** — insert lifecycle events ([`Notifier`])
//!
//! # Registering tables
//!
//! ```no_run
//! use rowgate_db::{GatewayConfig, TableCatalog};
//! use rowgate_sqlite::{SchemaManager, open};
//!
//! let config = GatewayConfig::load("rowgate.yml").unwrap();
//! let conn = open(&config).unwrap();
//! let catalog = TableCatalog::from_config(&config).unwrap();
//!
//! for report in SchemaManager::new(&conn, &config.locale).register(&catalog).unwrap() {
//!     println!("{}: created={} added={:?}", report.table, report.created, report.added_columns);
//! }
//! ```
//!
//! # Reading and writing rows
//!
//! ```no_run
//! use rowgate_core::Row;
//! use rowgate_db::TableCatalog;
//! use rowgate_sqlite::{TableGateway, TracingNotifier};
//! use rusqlite::Connection;
//!
//! let conn = Connection::open("app.db").unwrap();
//! let catalog = TableCatalog::from_dir("tables/").unwrap();
//! let orders = catalog.get("orders").unwrap().clone();
//!
//! let gateway = TableGateway::new(&conn, orders).with_notifier(TracingNotifier);
//! let id = gateway.insert(&Row::new().with("customer", "alice"), "order").unwrap();
//! gateway.update(id, &Row::new().with("status", "shipped")).unwrap();
//! ```

mod converge;
mod convert;
mod driver;
mod error;
mod gateway;
mod manager;
mod notify;
mod schema;

pub use converge::{Converge, ConvergeReport, SqliteConverger};
pub use driver::{CAP_COLLATION, Driver, open, quote_identifier};
pub use error::{GatewayError, Result};
pub use gateway::TableGateway;
pub use manager::{SchemaManager, TableDeclarations, TableStatus};
pub use notify::{InsertEvent, Notifier, NullNotifier, TracingNotifier};
pub use schema::{ColumnDdl, DdlStatement, IndexDdl, LocaleClause, sql_literal, table_ddl};

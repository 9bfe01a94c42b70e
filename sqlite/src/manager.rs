//! Schema registration for managed tables.
//!
//! [`SchemaManager`] turns table declarations into DDL and hands each
//! statement to a [`Converge`] implementation. Registration is stateless and
//! re-entrant: running it on every process start brings the database up to
//! date and is a no-op once it is.
//!
//! # Example
//!
//! ```
//! use rowgate_core::{ColumnDef, TableSchema};
//! use rowgate_db::LocaleConfig;
//! use rowgate_sqlite::SchemaManager;
//! use rusqlite::Connection;
//!
//! let conn = Connection::open_in_memory().unwrap();
//! let orders = TableSchema::new("orders")
//!     .with_column(ColumnDef::integer("id").not_null().auto_increment())
//!     .with_column(ColumnDef::text("customer").not_null());
//!
//! let manager = SchemaManager::new(&conn, &LocaleConfig::default());
//! let reports = manager.register(&orders).unwrap();
//! assert!(reports[0].created);
//!
//! // Safe to repeat
//! assert!(manager.register(&orders).unwrap()[0].is_noop());
//! ```

use rowgate_core::{TablePackage, TableSchema, Value, validate_package};
use rowgate_db::{LocaleConfig, TableCatalog};
use tracing::debug;

use crate::converge::{Converge, ConvergeReport, SqliteConverger};
use crate::driver::Driver;
use crate::error::{GatewayError, Result};
use crate::schema::{DdlStatement, LocaleClause, table_ddl};

/// Anything that declares one or more managed tables.
pub trait TableDeclarations {
    /// Returns one DDL statement per declared table.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidSchema`] if any descriptor is invalid.
    fn declare_tables(&self, locale: &LocaleClause) -> Result<Vec<DdlStatement>>;
}

impl TableDeclarations for TableSchema {
    fn declare_tables(&self, locale: &LocaleClause) -> Result<Vec<DdlStatement>> {
        Ok(vec![table_ddl(self, locale)?])
    }
}

impl TableDeclarations for [TableSchema] {
    fn declare_tables(&self, locale: &LocaleClause) -> Result<Vec<DdlStatement>> {
        self.iter().map(|table| table_ddl(table, locale)).collect()
    }
}

impl TableDeclarations for Vec<TableSchema> {
    fn declare_tables(&self, locale: &LocaleClause) -> Result<Vec<DdlStatement>> {
        self.as_slice().declare_tables(locale)
    }
}

impl TableDeclarations for TablePackage {
    fn declare_tables(&self, locale: &LocaleClause) -> Result<Vec<DdlStatement>> {
        let errors = validate_package(self);
        if !errors.is_empty() {
            return Err(GatewayError::InvalidSchema(errors));
        }
        self.tables.declare_tables(locale)
    }
}

impl TableDeclarations for TableCatalog {
    fn declare_tables(&self, locale: &LocaleClause) -> Result<Vec<DdlStatement>> {
        self.tables().declare_tables(locale)
    }
}

/// Installed state of one declared table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStatus {
    pub table: String,
    pub installed: bool,
    /// Live row count, when installed.
    pub rows: Option<u64>,
}

/// Registers managed tables against a driver.
pub struct SchemaManager<'a> {
    driver: &'a dyn Driver,
    locale: LocaleClause,
    converger: Box<dyn Converge + 'a>,
}

impl<'a> SchemaManager<'a> {
    /// Creates a manager, resolving the locale clause once for `driver`.
    pub fn new(driver: &'a dyn Driver, locale: &LocaleConfig) -> Self {
        let locale = LocaleClause::resolve(driver, locale);
        debug!(locale = %locale, "schema manager ready");
        Self {
            driver,
            locale,
            converger: Box::new(SqliteConverger),
        }
    }

    /// Replaces the idempotent-apply primitive.
    pub fn with_converger(mut self, converger: impl Converge + 'a) -> Self {
        self.converger = Box::new(converger);
        self
    }

    /// The resolved table-level locale clause.
    pub fn locale(&self) -> &LocaleClause {
        &self.locale
    }

    /// Returns the desired DDL without applying it.
    pub fn ddl<D: TableDeclarations + ?Sized>(&self, declarations: &D) -> Result<Vec<DdlStatement>> {
        declarations.declare_tables(&self.locale)
    }

    /// Brings every declared table up to date.
    ///
    /// All descriptors are validated before the first statement is issued.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidSchema`] for invalid descriptors, or
    /// the first error reported while converging a table. Tables converged
    /// before the failure stay converged.
    pub fn register<D: TableDeclarations + ?Sized>(
        &self,
        declarations: &D,
    ) -> Result<Vec<ConvergeReport>> {
        let statements = self.ddl(declarations)?;
        let mut reports = Vec::with_capacity(statements.len());
        for ddl in &statements {
            reports.push(self.converger.converge(self.driver, ddl)?);
        }
        Ok(reports)
    }

    /// Reports whether each declared table exists and how many rows it has.
    pub fn status<D: TableDeclarations + ?Sized>(&self, declarations: &D) -> Result<Vec<TableStatus>> {
        let statements = self.ddl(declarations)?;
        let mut statuses = Vec::with_capacity(statements.len());
        for ddl in &statements {
            let installed = self
                .driver
                .query_value(
                    "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    &[Value::from(ddl.table.as_str())],
                )?
                .is_some();
            let rows = if installed {
                let sql = format!(
                    "SELECT COUNT(*) FROM {}",
                    self.driver.escape_identifier(&ddl.table)
                );
                self.driver
                    .query_value(&sql, &[])?
                    .and_then(|count| count.as_i64())
                    .map(|count| count.max(0) as u64)
            } else {
                None
            };
            statuses.push(TableStatus {
                table: ddl.table.clone(),
                installed,
                rows,
            });
        }
        Ok(statuses)
    }
}

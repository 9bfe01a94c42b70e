//! Idempotent application of desired table definitions.
//!
//! [`Converge`] brings a live table to the shape a [`DdlStatement`]
//! describes without ever destroying data. [`SqliteConverger`] creates
//! missing tables, adds missing columns with `ALTER TABLE .. ADD COLUMN`
//! and ensures indexes exist. Columns present in the database but no longer
//! declared are reported and left in place.

use rowgate_core::Value;
use tracing::{debug, info, warn};

use crate::driver::Driver;
use crate::error::{GatewayError, Result};
use crate::schema::{ColumnDdl, DdlStatement};

/// Outcome of converging one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvergeReport {
    pub table: String,
    /// Table did not exist and was created.
    pub created: bool,
    /// Declared columns that were missing and have been added.
    pub added_columns: Vec<String>,
    /// Live columns the declaration no longer mentions. Never dropped.
    pub extra_columns: Vec<String>,
}

impl ConvergeReport {
    fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            ..Self::default()
        }
    }

    /// Returns `true` when the table already matched its declaration.
    pub fn is_noop(&self) -> bool {
        !self.created && self.added_columns.is_empty()
    }
}

/// Applies a desired definition to the live database.
///
/// Implementations must be idempotent: converging an up-to-date table
/// issues no schema changes and returns a no-op report.
pub trait Converge {
    fn converge(&self, driver: &dyn Driver, ddl: &DdlStatement) -> Result<ConvergeReport>;
}

/// Additive converger for SQLite.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteConverger;

impl Converge for SqliteConverger {
    fn converge(&self, driver: &dyn Driver, ddl: &DdlStatement) -> Result<ConvergeReport> {
        let mut report = ConvergeReport::new(&ddl.table);
        let live = live_columns(driver, &ddl.table)?;

        if live.is_empty() {
            driver.execute(&ddl.sql(), &[])?;
            info!(table = %ddl.table, columns = ddl.columns.len(), "created table");
            report.created = true;
        } else {
            let missing: Vec<&ColumnDdl> = ddl
                .columns
                .iter()
                .filter(|column| !live.iter().any(|name| name.eq_ignore_ascii_case(&column.name)))
                .collect();
            // Refuse the whole table before the first ALTER runs.
            for column in &missing {
                check_addable(&ddl.table, column)?;
            }

            for column in missing {
                let sql = format!(
                    "ALTER TABLE {} ADD COLUMN {}",
                    driver.escape_identifier(&ddl.table),
                    column.definition
                );
                driver.execute(&sql, &[])?;
                info!(table = %ddl.table, column = %column.name, "added column");
                report.added_columns.push(column.name.clone());
            }

            report.extra_columns = live
                .into_iter()
                .filter(|name| {
                    !ddl.columns
                        .iter()
                        .any(|column| column.name.eq_ignore_ascii_case(name))
                })
                .collect();
            if !report.extra_columns.is_empty() {
                warn!(
                    table = %ddl.table,
                    columns = ?report.extra_columns,
                    "live table has undeclared columns; leaving them in place"
                );
            }
        }

        for index in &ddl.indexes {
            driver.execute(&index.sql(), &[])?;
        }

        debug!(table = %ddl.table, noop = report.is_noop(), "converged");
        Ok(report)
    }
}

/// Column names of `table` in declaration order; empty if it does not exist.
fn live_columns(driver: &dyn Driver, table: &str) -> Result<Vec<String>> {
    let rows = driver.query_rows(
        "SELECT name FROM pragma_table_info(?1)",
        &[Value::from(table)],
    )?;
    Ok(rows
        .iter()
        .filter_map(|row| row.get("name").and_then(Value::as_str).map(String::from))
        .collect())
}

/// SQLite cannot add key, unique, or defaultless NOT NULL columns in place.
fn check_addable(table: &str, column: &ColumnDdl) -> Result<()> {
    let reason = if column.primary_key {
        Some("primary key columns cannot be added to an existing table")
    } else if column.unique {
        Some("UNIQUE columns cannot be added to an existing table")
    } else if column.not_null && !column.has_default {
        Some("NOT NULL columns need a default to be added to an existing table")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(GatewayError::Convergence {
            table: table.to_string(),
            message: format!("column `{}`: {reason}", column.name),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{LocaleClause, table_ddl};
    use rowgate_core::{ColumnDef, IndexDef, TableSchema};
    use rusqlite::Connection;

    fn v1() -> TableSchema {
        TableSchema::new("notes")
            .with_column(ColumnDef::integer("id").not_null().auto_increment())
            .with_column(ColumnDef::text("body"))
    }

    fn ddl(schema: &TableSchema) -> DdlStatement {
        table_ddl(schema, &LocaleClause::none()).unwrap()
    }

    #[test]
    fn test_create_then_noop() {
        let conn = Connection::open_in_memory().unwrap();
        let converger = SqliteConverger;

        let first = converger.converge(&conn, &ddl(&v1())).unwrap();
        assert!(first.created);
        assert!(!first.is_noop());

        let second = converger.converge(&conn, &ddl(&v1())).unwrap();
        assert!(second.is_noop());
        assert!(second.extra_columns.is_empty());
    }

    #[test]
    fn test_adds_missing_columns_and_keeps_data() {
        let conn = Connection::open_in_memory().unwrap();
        let converger = SqliteConverger;
        converger.converge(&conn, &ddl(&v1())).unwrap();
        conn.execute("INSERT INTO notes (body) VALUES ('hello')", [])
            .unwrap();

        let v2 = v1()
            .with_column(ColumnDef::text("author").not_null().with_default("anon"))
            .with_index(IndexDef::new("idx_notes_author", ["author"]));
        let report = converger.converge(&conn, &ddl(&v2)).unwrap();
        assert_eq!(report.added_columns, vec!["author".to_string()]);

        let (body, author): (String, String) = conn
            .query_row("SELECT body, author FROM notes", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!((body.as_str(), author.as_str()), ("hello", "anon"));

        let index: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = 'idx_notes_author'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(index, 1);
    }

    #[test]
    fn test_extra_columns_are_reported_not_dropped() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT, legacy TEXT);")
            .unwrap();

        let report = SqliteConverger.converge(&conn, &ddl(&v1())).unwrap();
        assert!(report.is_noop());
        assert_eq!(report.extra_columns, vec!["legacy".to_string()]);
        assert_eq!(live_columns(&conn, "notes").unwrap().len(), 3);
    }

    #[test]
    fn test_refuses_defaultless_not_null_column() {
        let conn = Connection::open_in_memory().unwrap();
        SqliteConverger.converge(&conn, &ddl(&v1())).unwrap();

        let v2 = v1().with_column(ColumnDef::text("title").not_null());
        let err = SqliteConverger.converge(&conn, &ddl(&v2)).unwrap_err();
        assert!(matches!(err, GatewayError::Convergence { ref table, .. } if table == "notes"));
    }

    #[test]
    fn test_refused_convergence_leaves_table_untouched() {
        let conn = Connection::open_in_memory().unwrap();
        SqliteConverger.converge(&conn, &ddl(&v1())).unwrap();

        let v2 = v1()
            .with_column(ColumnDef::text("author"))
            .with_column(ColumnDef::text("title").not_null());
        let err = SqliteConverger.converge(&conn, &ddl(&v2)).unwrap_err();
        assert!(matches!(err, GatewayError::Convergence { ref message, .. } if message.contains("title")));
        assert_eq!(live_columns(&conn, "notes").unwrap(), vec!["id", "body"]);
    }
}

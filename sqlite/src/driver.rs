//! The database driver seam.
//!
//! Gateways and the schema manager never talk to a connection directly; they
//! go through [`Driver`], which runs parameterised statements, escapes
//! identifiers and reports engine capabilities. [`rusqlite::Connection`]
//! implements it, and tests can wrap a connection to observe or alter what
//! the gateway sends.

use std::time::Duration;

use rowgate_core::{Row, Value};
use rowgate_db::GatewayConfig;
use rusqlite::{Connection, params_from_iter};
use tracing::debug;

use crate::convert;
use crate::error::Result;

/// Capability name for table-level character set and collation clauses.
pub const CAP_COLLATION: &str = "collation";

/// A synchronous database driver.
///
/// Values in `params` bind to `?1`, `?2`, ... in order. Identifiers must be
/// passed through [`escape_identifier`](Driver::escape_identifier) before
/// they are interpolated into statement text.
pub trait Driver {
    /// Runs a query and returns its first row, if any.
    fn query_row(&self, sql: &str, params: &[Value]) -> Result<Option<Row>>;

    /// Runs a query and returns the first column of its first row, if any.
    fn query_value(&self, sql: &str, params: &[Value]) -> Result<Option<Value>>;

    /// Runs a query and returns every row.
    fn query_rows(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Runs a statement and returns the number of affected rows.
    fn execute(&self, sql: &str, params: &[Value]) -> Result<usize>;

    /// Runs an insert and returns the engine's row id for the new row.
    ///
    /// For SQLite this is the rowid, which is the primary key only when the
    /// key is an `INTEGER PRIMARY KEY` column.
    fn insert(&self, sql: &str, params: &[Value]) -> Result<i64>;

    /// Quotes `raw` as a single identifier, neutralising any quote
    /// characters it contains.
    fn escape_identifier(&self, raw: &str) -> String;

    /// Returns `true` if the engine supports the named capability.
    fn has_capability(&self, capability: &str) -> bool;
}

/// Quotes an identifier with backticks, doubling embedded backticks.
///
/// SQLite never reinterprets a backtick-quoted name as a string literal, so
/// an unknown column fails loudly instead of matching a constant.
///
/// # Examples
///
/// ```
/// use rowgate_sqlite::quote_identifier;
///
/// assert_eq!(quote_identifier("status"), "`status`");
/// assert_eq!(quote_identifier("a`b"), "`a``b`");
/// ```
pub fn quote_identifier(raw: &str) -> String {
    format!("`{}`", raw.replace('`', "``"))
}

impl Driver for Connection {
    fn query_row(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        debug!(sql, params = params.len(), "query_row");
        let mut stmt = self.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query(params_from_iter(params.iter().map(convert::to_sql)))?;
        match rows.next()? {
            Some(row) => Ok(Some(convert::read_row(row, &names)?)),
            None => Ok(None),
        }
    }

    fn query_value(&self, sql: &str, params: &[Value]) -> Result<Option<Value>> {
        debug!(sql, params = params.len(), "query_value");
        let mut stmt = self.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(params.iter().map(convert::to_sql)))?;
        match rows.next()? {
            Some(row) => Ok(Some(convert::from_sql(row.get_ref(0)?)?)),
            None => Ok(None),
        }
    }

    fn query_rows(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        debug!(sql, params = params.len(), "query_rows");
        let mut stmt = self.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query(params_from_iter(params.iter().map(convert::to_sql)))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(convert::read_row(row, &names)?);
        }
        Ok(out)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        debug!(sql, params = params.len(), "execute");
        let affected =
            Connection::execute(self, sql, params_from_iter(params.iter().map(convert::to_sql)))?;
        Ok(affected)
    }

    fn insert(&self, sql: &str, params: &[Value]) -> Result<i64> {
        Driver::execute(self, sql, params)?;
        Ok(self.last_insert_rowid())
    }

    fn escape_identifier(&self, raw: &str) -> String {
        quote_identifier(raw)
    }

    fn has_capability(&self, _capability: &str) -> bool {
        // SQLite has per-column COLLATE only; no table-level locale clause.
        false
    }
}

/// Opens the database named by `config`.
///
/// A missing `database` path opens an in-memory database. The busy timeout
/// is applied and foreign key enforcement is switched on.
///
/// # Errors
///
/// Returns [`GatewayError::Driver`](crate::GatewayError::Driver) if the
/// database cannot be opened or configured.
pub fn open(config: &GatewayConfig) -> Result<Connection> {
    let conn = match &config.database {
        Some(path) => Connection::open(path)?,
        None => Connection::open_in_memory()?,
    };
    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    debug!(database = ?config.database, "opened connection");
    Ok(conn)
}

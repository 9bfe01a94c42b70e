//! Row-level access to one managed table.
//!
//! A [`TableGateway`] pairs an injected [`Driver`] with a [`TableSchema`]
//! and issues exactly one parameterised statement per operation. Values are
//! always bound; identifiers (table, primary key and caller-named columns)
//! are always passed through [`Driver::escape_identifier`]. Writes are
//! merged over the descriptor's defaults (inserts only), canonicalised and
//! filtered to the column whitelist before anything is sent.
//!
//! # Example
//!
//! ```
//! use rowgate_core::{ColumnDef, Row, TableSchema, Value};
//! use rowgate_db::LocaleConfig;
//! use rowgate_sqlite::{SchemaManager, TableGateway};
//! use rusqlite::Connection;
//!
//! let conn = Connection::open_in_memory().unwrap();
//! let orders = TableSchema::new("orders")
//!     .with_column(ColumnDef::integer("id").not_null().auto_increment())
//!     .with_column(ColumnDef::text("customer").not_null())
//!     .with_column(ColumnDef::text("status").with_default("pending"));
//! SchemaManager::new(&conn, &LocaleConfig::default()).register(&orders).unwrap();
//!
//! let gateway = TableGateway::new(&conn, orders);
//! let id = gateway.insert(&Row::new().with("customer", "alice"), "order").unwrap();
//! assert_eq!(gateway.fetch_field("status", id).unwrap(), Some(Value::from("pending")));
//! ```

use rowgate_core::{BindSequence, ColumnFormat, Row, TableSchema, Value, merge_defaults};
use tracing::debug;

use crate::driver::Driver;
use crate::error::{GatewayError, Result};
use crate::notify::{InsertEvent, Notifier, NullNotifier};

/// Gateway to a single table described by a [`TableSchema`].
pub struct TableGateway<'a> {
    driver: &'a dyn Driver,
    schema: TableSchema,
    notifier: Box<dyn Notifier + 'a>,
}

impl<'a> TableGateway<'a> {
    /// Creates a gateway with a [`NullNotifier`].
    pub fn new(driver: &'a dyn Driver, schema: TableSchema) -> Self {
        Self {
            driver,
            schema,
            notifier: Box::new(NullNotifier),
        }
    }

    /// Replaces the insert event subscriber.
    pub fn with_notifier(mut self, notifier: impl Notifier + 'a) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Table name.
    pub fn table(&self) -> &str {
        &self.schema.name
    }

    /// Writable columns and their bind formats, in declaration order.
    pub fn columns(&self) -> Vec<(&str, ColumnFormat)> {
        self.schema.columns()
    }

    /// Values used to fill columns an insert omits.
    pub fn defaults(&self) -> Row {
        self.schema.defaults()
    }

    fn quoted_table(&self) -> String {
        self.driver.escape_identifier(&self.schema.name)
    }

    fn quoted_primary_key(&self) -> String {
        self.driver.escape_identifier(&self.schema.primary_key)
    }

    /// Fetches the row whose primary key equals `id`.
    pub fn fetch_by_id(&self, id: impl Into<Value>) -> Result<Option<Row>> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?1 LIMIT 1",
            self.quoted_table(),
            self.quoted_primary_key()
        );
        debug!(table = %self.schema.name, op = "fetch_by_id", "issuing statement");
        self.driver.query_row(&sql, &[id.into()])
    }

    /// Fetches the first row where `column` equals `value`.
    ///
    /// `column` is escaped as an identifier; `value` is bound unchanged.
    pub fn fetch_by_column(&self, column: &str, value: impl Into<Value>) -> Result<Option<Row>> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?1 LIMIT 1",
            self.quoted_table(),
            self.driver.escape_identifier(column)
        );
        debug!(table = %self.schema.name, op = "fetch_by_column", "issuing statement");
        self.driver.query_row(&sql, &[value.into()])
    }

    /// Fetches a single field of the row whose primary key equals `id`.
    pub fn fetch_field(&self, column: &str, id: impl Into<Value>) -> Result<Option<Value>> {
        let primary_key = self.schema.primary_key.clone();
        self.fetch_field_by(column, &primary_key, id)
    }

    /// Fetches `column` from the first row where `where_column` equals
    /// `where_value`. Both column names are escaped as identifiers.
    pub fn fetch_field_by(
        &self,
        column: &str,
        where_column: &str,
        where_value: impl Into<Value>,
    ) -> Result<Option<Value>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1 LIMIT 1",
            self.driver.escape_identifier(column),
            self.quoted_table(),
            self.driver.escape_identifier(where_column)
        );
        debug!(table = %self.schema.name, op = "fetch_field", "issuing statement");
        self.driver.query_value(&sql, &[where_value.into()])
    }

    /// Inserts a row and returns its generated id.
    ///
    /// The id is the driver's row id. It equals the primary key, and so
    /// works with [`fetch_by_id`](Self::fetch_by_id), when the key is an
    /// auto-increment integer column. Tables keyed by any other column
    /// should be read back with [`fetch_by_column`](Self::fetch_by_column).
    ///
    /// `data` is laid over [`defaults`](Self::defaults), announced as
    /// `pre_insert_<event_tag>`, filtered to the whitelist and written. The
    /// written payload is then announced as `post_insert_<event_tag>` with
    /// the new id. A payload with no whitelisted keys inserts a row of
    /// column defaults.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Driver`] if the insert fails; no post-insert
    /// event is sent in that case.
    pub fn insert(&self, data: &Row, event_tag: &str) -> Result<i64> {
        let merged = merge_defaults(&self.schema.defaults(), data);
        self.notifier.notify(&InsertEvent::PreInsert {
            tag: event_tag,
            data: &merged,
        });

        let binds = BindSequence::build(&self.schema, &merged);
        let sql = if binds.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", self.quoted_table())
        } else {
            let columns = binds
                .columns()
                .into_iter()
                .map(|column| self.driver.escape_identifier(column))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "INSERT INTO {} ({columns}) VALUES ({})",
                self.quoted_table(),
                placeholders(1, binds.len())
            )
        };

        let written = binds.to_row();
        debug!(table = %self.schema.name, op = "insert", columns = binds.len(), "issuing statement");
        let id = self.driver.insert(&sql, &binds.into_values())?;

        self.notifier.notify(&InsertEvent::PostInsert {
            tag: event_tag,
            id,
            data: &written,
        });
        Ok(id)
    }

    /// Updates the row whose primary key equals `id`.
    ///
    /// See [`update_where`](Self::update_where).
    pub fn update(&self, id: i64, data: &Row) -> Result<usize> {
        let primary_key = self.schema.primary_key.clone();
        self.update_where(id, data, &primary_key)
    }

    /// Updates rows where `where_column` equals `id`.
    ///
    /// Returns the number of affected rows. Zero matched rows is still
    /// `Ok(0)`, as is a payload with no whitelisted keys (no statement is
    /// issued for it).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidId`] without issuing a statement when
    /// `id` is not positive, or [`GatewayError::Driver`] if the update fails.
    pub fn update_where(&self, id: i64, data: &Row, where_column: &str) -> Result<usize> {
        check_id(id)?;

        let binds = BindSequence::build(&self.schema, data);
        if binds.is_empty() {
            debug!(table = %self.schema.name, op = "update", "nothing writable in payload");
            return Ok(0);
        }

        let assignments = binds
            .columns()
            .into_iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", self.driver.escape_identifier(column), i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {assignments} WHERE {} = ?{}",
            self.quoted_table(),
            self.driver.escape_identifier(where_column),
            binds.len() + 1
        );

        let mut params = binds.into_values();
        params.push(Value::Integer(id));
        debug!(table = %self.schema.name, op = "update", columns = params.len() - 1, "issuing statement");
        self.driver.execute(&sql, &params)
    }

    /// Deletes the row whose primary key equals `id`.
    ///
    /// Returns the number of deleted rows; zero is still `Ok(0)`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidId`] without issuing a statement when
    /// `id` is not positive, or [`GatewayError::Driver`] if the delete fails.
    pub fn delete(&self, id: i64) -> Result<usize> {
        check_id(id)?;
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?1",
            self.quoted_table(),
            self.quoted_primary_key()
        );
        debug!(table = %self.schema.name, op = "delete", "issuing statement");
        self.driver.execute(&sql, &[Value::Integer(id)])
    }

    /// Number of rows in the table.
    pub fn count(&self) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.quoted_table());
        debug!(table = %self.schema.name, op = "count", "issuing statement");
        let count = self
            .driver
            .query_value(&sql, &[])?
            .and_then(|value| value.as_i64())
            .unwrap_or(0);
        Ok(count.max(0) as u64)
    }

    /// Returns `true` if a table with exactly this name exists.
    ///
    /// The name is trimmed and stripped of characters outside
    /// `[A-Za-z0-9_]` before it is looked up.
    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let sanitized = sanitize_table_name(name);
        if sanitized.is_empty() {
            return Ok(false);
        }
        debug!(table = %sanitized, op = "table_exists", "issuing statement");
        let found = self.driver.query_value(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            &[Value::from(sanitized.as_str())],
        )?;
        Ok(found.as_ref().and_then(Value::as_str) == Some(sanitized.as_str()))
    }

    /// Returns `true` once this gateway's table has been created.
    pub fn installed(&self) -> Result<bool> {
        self.table_exists(&self.schema.name)
    }
}

fn check_id(id: i64) -> Result<()> {
    if id <= 0 {
        return Err(GatewayError::InvalidId(id));
    }
    Ok(())
}

fn sanitize_table_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

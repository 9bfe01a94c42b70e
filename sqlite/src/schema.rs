//! DDL generation from table descriptors.
//!
//! Turns a [`TableSchema`] into a [`DdlStatement`]: one `CREATE TABLE`
//! text plus `CREATE INDEX IF NOT EXISTS` statements for its secondary
//! indexes. Statements are rebuilt from the descriptor on every schema
//! manager run and never cached.
//!
//! # Example
//!
//! ```
//! use rowgate_core::{ColumnDef, TableSchema};
//! use rowgate_sqlite::{LocaleClause, table_ddl};
//!
//! let orders = TableSchema::new("orders")
//!     .with_column(ColumnDef::integer("id").not_null().auto_increment())
//!     .with_column(ColumnDef::text("status").with_default("pending"));
//!
//! let ddl = table_ddl(&orders, &LocaleClause::none()).unwrap();
//! assert_eq!(
//!     ddl.sql(),
//!     "CREATE TABLE `orders` (\n    \
//!      `id` INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,\n    \
//!      `status` TEXT DEFAULT 'pending'\n)"
//! );
//! ```

use std::fmt;

use rowgate_core::{
    ColumnDef, ColumnFormat, IndexDef, TableSchema, Value, is_valid_identifier, validate_table,
};
use rowgate_db::LocaleConfig;
use tracing::warn;

use crate::driver::{CAP_COLLATION, Driver, quote_identifier};
use crate::error::{GatewayError, Result};

/// Table-level character set / collation suffix of a `CREATE TABLE`.
///
/// Empty unless the driver supports table-level locale clauses and a
/// character set or collation is configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleClause(String);

impl LocaleClause {
    /// The empty clause.
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds the clause from `config` without consulting any driver.
    ///
    /// Values that are not plain identifiers are skipped with a warning.
    ///
    /// # Examples
    ///
    /// ```
    /// use rowgate_db::LocaleConfig;
    /// use rowgate_sqlite::LocaleClause;
    ///
    /// let both = LocaleConfig::new(Some("utf8mb4"), Some("utf8mb4_unicode_ci"));
    /// assert_eq!(
    ///     LocaleClause::from_config(&both).as_str(),
    ///     "DEFAULT CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci"
    /// );
    ///
    /// let collation = LocaleConfig::new(None, Some("nocase"));
    /// assert_eq!(LocaleClause::from_config(&collation).as_str(), "COLLATE nocase");
    /// ```
    pub fn from_config(config: &LocaleConfig) -> Self {
        let charset = usable_locale_value("charset", config.charset.as_deref());
        let collation = usable_locale_value("collation", config.collation.as_deref());

        let mut parts = Vec::with_capacity(2);
        if let Some(charset) = charset {
            parts.push(format!("DEFAULT CHARACTER SET {charset}"));
        }
        if let Some(collation) = collation {
            parts.push(format!("COLLATE {collation}"));
        }
        Self(parts.join(" "))
    }

    /// Builds the clause only if `driver` reports the collation capability.
    pub fn resolve(driver: &dyn Driver, config: &LocaleConfig) -> Self {
        if driver.has_capability(CAP_COLLATION) {
            Self::from_config(config)
        } else {
            Self::none()
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LocaleClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn usable_locale_value<'a>(key: &str, value: Option<&'a str>) -> Option<&'a str> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    if is_valid_identifier(value) {
        Some(value)
    } else {
        warn!(key, value, "ignoring locale setting that is not a plain identifier");
        None
    }
}

/// One column definition inside a `CREATE TABLE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDdl {
    /// Canonical column name.
    pub name: String,
    /// Full definition text, starting with the quoted name.
    pub definition: String,
    pub not_null: bool,
    pub has_default: bool,
    pub unique: bool,
    pub primary_key: bool,
}

/// A `CREATE INDEX IF NOT EXISTS` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDdl {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl IndexDdl {
    fn new(table: &str, index: &IndexDef) -> Self {
        Self {
            name: index.name.clone(),
            table: table.to_string(),
            columns: index.columns.clone(),
            unique: index.unique,
        }
    }

    pub fn sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "CREATE {}INDEX IF NOT EXISTS {} ON {} ({columns})",
            if self.unique { "UNIQUE " } else { "" },
            quote_identifier(&self.name),
            quote_identifier(&self.table),
        )
    }
}

/// Desired definition of one managed table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdlStatement {
    pub table: String,
    pub columns: Vec<ColumnDdl>,
    /// Table constraints, e.g. a separate `PRIMARY KEY (..)`.
    pub constraints: Vec<String>,
    pub indexes: Vec<IndexDdl>,
    pub locale: LocaleClause,
}

impl DdlStatement {
    /// The `CREATE TABLE` text.
    pub fn sql(&self) -> String {
        let body = self
            .columns
            .iter()
            .map(|column| column.definition.as_str())
            .chain(self.constraints.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(",\n    ");
        let mut sql = format!("CREATE TABLE {} (\n    {body}\n)", quote_identifier(&self.table));
        if !self.locale.is_empty() {
            sql.push(' ');
            sql.push_str(self.locale.as_str());
        }
        sql
    }

    /// Looks up a column definition by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDdl> {
        self.columns.iter().find(|column| column.name == name)
    }
}

impl fmt::Display for DdlStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{};", self.sql())?;
        for index in &self.indexes {
            writeln!(f, "{};", index.sql())?;
        }
        Ok(())
    }
}

/// Generates the DDL for one descriptor.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidSchema`] if the descriptor fails
/// validation; no text is generated for an invalid descriptor.
pub fn table_ddl(schema: &TableSchema, locale: &LocaleClause) -> Result<DdlStatement> {
    let errors = validate_table(schema);
    if !errors.is_empty() {
        return Err(GatewayError::InvalidSchema(errors));
    }

    let inline_key = schema
        .primary_key_column()
        .is_some_and(|column| column.auto_increment);

    let columns = schema
        .columns
        .iter()
        .map(|column| column_ddl(column, column.name == schema.primary_key, inline_key))
        .collect();

    let mut constraints = Vec::new();
    if !inline_key {
        constraints.push(format!(
            "PRIMARY KEY ({})",
            quote_identifier(&schema.primary_key)
        ));
    }

    Ok(DdlStatement {
        table: schema.name.clone(),
        columns,
        constraints,
        indexes: schema
            .indexes
            .iter()
            .map(|index| IndexDdl::new(&schema.name, index))
            .collect(),
        locale: locale.clone(),
    })
}

fn column_ddl(column: &ColumnDef, is_primary_key: bool, inline_key: bool) -> ColumnDdl {
    let mut definition = quote_identifier(&column.name);
    if is_primary_key && inline_key {
        // AUTOINCREMENT is only accepted on exactly INTEGER PRIMARY KEY.
        definition.push_str(" INTEGER PRIMARY KEY AUTOINCREMENT");
    } else {
        definition.push(' ');
        definition.push_str(column.column_type.sql_name());
    }
    if !column.nullable {
        definition.push_str(" NOT NULL");
    }
    if column.unique && !is_primary_key {
        definition.push_str(" UNIQUE");
    }
    if let Some(default) = &column.default {
        definition.push_str(" DEFAULT ");
        definition.push_str(&sql_literal(default, column.format()));
    }

    ColumnDdl {
        name: column.name.clone(),
        definition,
        not_null: !column.nullable,
        has_default: column.default.is_some(),
        unique: column.unique,
        primary_key: is_primary_key,
    }
}

/// Renders a default value as an SQL literal, coerced to the column format.
pub fn sql_literal(value: &Value, format: ColumnFormat) -> String {
    match format.coerce(value.clone()) {
        Value::Null => "NULL".to_string(),
        Value::Integer(v) => v.to_string(),
        Value::Real(v) if v.is_finite() => format!("{v:?}"),
        Value::Real(_) => "NULL".to_string(),
        Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Blob(bytes) => {
            let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
            format!("X'{hex}'")
        }
    }
}

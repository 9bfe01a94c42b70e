//! Descriptor and package validation.
//!
//! Catches structural problems in [`TableSchema`] declarations (bad
//! identifiers, duplicate columns, a primary key that is not declared,
//! defaults of the wrong kind) before any DDL is generated from them.
//!
//! # Examples
//!
//! ```
//! use rowgate_core::*;
//!
//! let good = TableSchema::new("orders")
//!     .with_column(ColumnDef::integer("id").auto_increment());
//! assert!(validate_table(&good).is_empty());
//!
//! // Column names must be canonical lowercase identifiers
//! let bad = TableSchema::new("orders")
//!     .with_column(ColumnDef::integer("id"))
//!     .with_column(ColumnDef::text("Customer"));
//! assert!(!validate_table(&bad).is_empty());
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::{ColumnDef, ColumnFormat, ColumnType, TablePackage, TableSchema, Value};

static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex must compile")
});

static CANONICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("static regex must compile"));

/// Returns `true` if `name` is a plain SQL identifier (letters, digits and
/// underscores, not starting with a digit).
///
/// # Examples
///
/// ```
/// use rowgate_core::is_valid_identifier;
///
/// assert!(is_valid_identifier("wp_orders"));
/// assert!(!is_valid_identifier("orders; DROP TABLE x"));
/// assert!(!is_valid_identifier("1st"));
/// ```
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER_RE.is_match(name)
}

/// Returns `true` if `name` is a valid identifier already in canonical
/// (lowercase) form.
pub fn is_canonical_identifier(name: &str) -> bool {
    CANONICAL_RE.is_match(name)
}

/// Descriptor/package validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Package version string is empty.
    #[error("package version cannot be empty")]
    EmptyPackageVersion,
    /// Two descriptors in the same package share a table name.
    #[error("duplicate table in package: {0}")]
    DuplicateTable(String),
    /// Table name is not a plain identifier.
    #[error("invalid table name '{0}': must contain only alphanumeric characters and underscores")]
    InvalidTableName(String),
    /// Version tag is empty.
    #[error("table {0} has an empty version tag")]
    EmptyVersion(String),
    /// Descriptor declares no columns.
    #[error("table {0} declares no columns")]
    NoColumns(String),
    /// Column name is not a canonical lowercase identifier.
    #[error("invalid column name '{column}' in table {table}")]
    InvalidColumnName { table: String, column: String },
    /// Column declared twice.
    #[error("duplicate column '{column}' in table {table}")]
    DuplicateColumn { table: String, column: String },
    /// Primary key is not one of the declared columns.
    #[error("primary key '{primary_key}' is not a declared column of table {table}")]
    MissingPrimaryKey { table: String, primary_key: String },
    /// More than one column is engine-generated.
    #[error("table {0} declares more than one auto-increment column")]
    MultipleAutoIncrement(String),
    /// Auto-increment requested on a column that is not an integer.
    #[error("auto-increment column '{column}' in table {table} must be an integer")]
    AutoIncrementNotInteger { table: String, column: String },
    /// Declared default does not fit the column's bind format.
    #[error("default for column '{column}' in table {table} is {found}, expected {expected}")]
    DefaultTypeMismatch {
        table: String,
        column: String,
        expected: &'static str,
        found: &'static str,
    },
    /// Index name is invalid or the index has no columns.
    #[error("invalid index '{index}' on table {table}")]
    InvalidIndex { table: String, index: String },
    /// Index references a column the table does not declare.
    #[error("index '{index}' on table {table} references unknown column '{column}'")]
    UnknownIndexColumn {
        table: String,
        index: String,
        column: String,
    },
}

/// Validates a table package.
///
/// Checks for an empty version string and duplicate table names, then
/// validates each descriptor.
///
/// # Examples
///
/// ```
/// use rowgate_core::*;
///
/// let table = TableSchema::new("orders").with_column(ColumnDef::integer("id"));
/// let mut package = TablePackage::new("1.0.0");
/// package.tables.push(table.clone());
/// assert!(validate_package(&package).is_empty());
///
/// package.tables.push(table);
/// let errors = validate_package(&package);
/// assert!(errors.iter().any(|e| matches!(e, ValidationError::DuplicateTable(_))));
/// ```
pub fn validate_package(package: &TablePackage) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if package.version.trim().is_empty() {
        errors.push(ValidationError::EmptyPackageVersion);
        return errors;
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for table in &package.tables {
        if !seen.insert(table.name.as_str()) {
            errors.push(ValidationError::DuplicateTable(table.name.clone()));
            continue;
        }
        errors.extend(validate_table(table));
    }

    errors
}

/// Validates a single table descriptor, returning every problem found.
pub fn validate_table(schema: &TableSchema) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let table = schema.name.as_str();

    if !is_valid_identifier(table) {
        errors.push(ValidationError::InvalidTableName(table.to_string()));
    }
    if schema.version.trim().is_empty() {
        errors.push(ValidationError::EmptyVersion(table.to_string()));
    }
    if schema.columns.is_empty() {
        errors.push(ValidationError::NoColumns(table.to_string()));
        return errors;
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut auto_increment = 0;
    for column in &schema.columns {
        let name = column.name.as_str();
        if !is_canonical_identifier(name) {
            errors.push(ValidationError::InvalidColumnName {
                table: table.to_string(),
                column: name.to_string(),
            });
        }
        if !seen.insert(name) {
            errors.push(ValidationError::DuplicateColumn {
                table: table.to_string(),
                column: name.to_string(),
            });
        }
        if column.auto_increment {
            auto_increment += 1;
            if column.column_type.default_format() != ColumnFormat::Integer {
                errors.push(ValidationError::AutoIncrementNotInteger {
                    table: table.to_string(),
                    column: name.to_string(),
                });
            }
        }
        if let Some(value) = &column.default {
            if let Some(expected) = default_mismatch(column, value) {
                errors.push(ValidationError::DefaultTypeMismatch {
                    table: table.to_string(),
                    column: name.to_string(),
                    expected,
                    found: value.type_name(),
                });
            }
        }
    }

    if auto_increment > 1 {
        errors.push(ValidationError::MultipleAutoIncrement(table.to_string()));
    }
    if schema.primary_key_column().is_none() {
        errors.push(ValidationError::MissingPrimaryKey {
            table: table.to_string(),
            primary_key: schema.primary_key.clone(),
        });
    }

    for index in &schema.indexes {
        if !is_valid_identifier(&index.name) || index.columns.is_empty() {
            errors.push(ValidationError::InvalidIndex {
                table: table.to_string(),
                index: index.name.clone(),
            });
        }
        for column in &index.columns {
            if !schema.is_writable(column) {
                errors.push(ValidationError::UnknownIndexColumn {
                    table: table.to_string(),
                    index: index.name.clone(),
                    column: column.clone(),
                });
            }
        }
    }

    errors
}

/// Returns the expected kind when `value` does not fit `column`.
fn default_mismatch(column: &ColumnDef, value: &Value) -> Option<&'static str> {
    let fits = match (column.format(), value) {
        (_, Value::Null) => true,
        (ColumnFormat::Integer, Value::Integer(_)) => true,
        (ColumnFormat::Float, Value::Integer(_) | Value::Real(_)) => true,
        (ColumnFormat::Text, Value::Text(_)) => true,
        (ColumnFormat::Text, Value::Blob(_)) => column.column_type == ColumnType::Blob,
        _ => false,
    };
    if fits {
        return None;
    }
    Some(match column.format() {
        ColumnFormat::Integer => "integer",
        ColumnFormat::Float => "number",
        ColumnFormat::Text => "text",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IndexDef;

    fn base() -> TableSchema {
        TableSchema::new("orders")
            .with_column(ColumnDef::integer("id").not_null().auto_increment())
            .with_column(ColumnDef::text("customer"))
    }

    #[test]
    fn test_valid_descriptor() {
        assert!(validate_table(&base()).is_empty());
    }

    #[test]
    fn test_invalid_table_name() {
        let schema = TableSchema::new("orders;--").with_column(ColumnDef::integer("id"));
        assert_eq!(
            validate_table(&schema),
            vec![ValidationError::InvalidTableName("orders;--".into())]
        );
    }

    #[test]
    fn test_no_columns() {
        let errors = validate_table(&TableSchema::new("orders"));
        assert_eq!(errors, vec![ValidationError::NoColumns("orders".into())]);
    }

    #[test]
    fn test_duplicate_and_non_canonical_columns() {
        let schema = base()
            .with_column(ColumnDef::text("customer"))
            .with_column(ColumnDef::text("Total"));
        let errors = validate_table(&schema);
        assert!(errors.contains(&ValidationError::DuplicateColumn {
            table: "orders".into(),
            column: "customer".into(),
        }));
        assert!(errors.contains(&ValidationError::InvalidColumnName {
            table: "orders".into(),
            column: "Total".into(),
        }));
    }

    #[test]
    fn test_missing_primary_key() {
        let schema = base().with_primary_key("order_id");
        assert!(validate_table(&schema).contains(&ValidationError::MissingPrimaryKey {
            table: "orders".into(),
            primary_key: "order_id".into(),
        }));
    }

    #[test]
    fn test_auto_increment_rules() {
        let schema = base().with_column(ColumnDef::text("code").auto_increment());
        let errors = validate_table(&schema);
        assert!(errors.contains(&ValidationError::MultipleAutoIncrement("orders".into())));
        assert!(errors.contains(&ValidationError::AutoIncrementNotInteger {
            table: "orders".into(),
            column: "code".into(),
        }));
    }

    #[test]
    fn test_default_type_mismatch() {
        let schema = base()
            .with_column(ColumnDef::integer("qty").with_default("many"))
            .with_column(ColumnDef::real("total").with_default(0));
        let errors = validate_table(&schema);
        assert_eq!(
            errors,
            vec![ValidationError::DefaultTypeMismatch {
                table: "orders".into(),
                column: "qty".into(),
                expected: "integer",
                found: "text",
            }]
        );
    }

    #[test]
    fn test_index_checks() {
        let schema = base()
            .with_index(IndexDef::new("idx_orders_customer", ["customer"]))
            .with_index(IndexDef::new("idx_orders_status", ["status"]));
        assert_eq!(
            validate_table(&schema),
            vec![ValidationError::UnknownIndexColumn {
                table: "orders".into(),
                index: "idx_orders_status".into(),
                column: "status".into(),
            }]
        );
    }

    #[test]
    fn test_identifier_helpers() {
        assert!(is_valid_identifier("_t1"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("a b"));
        assert!(is_canonical_identifier("status"));
        assert!(!is_canonical_identifier("Status"));
    }

    #[test]
    fn test_package_empty_version() {
        let package = TablePackage::new("  ");
        assert_eq!(
            validate_package(&package),
            vec![ValidationError::EmptyPackageVersion]
        );
    }
}

//! Conversion between rowgate [`Value`]s and SQLite values.
//!
//! Parameters are bound as owned [`rusqlite::types::Value`]s; result cells
//! are read through [`ValueRef`] so every storage class maps to exactly one
//! [`Value`] variant.

use rowgate_core::{Row, Value};
use rusqlite::types::{Value as SqlValue, ValueRef};

use crate::error::{GatewayError, Result};

/// Converts a bind value for use as a statement parameter.
pub(crate) fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(v) => SqlValue::Integer(*v),
        Value::Real(v) => SqlValue::Real(*v),
        Value::Text(v) => SqlValue::Text(v.clone()),
        Value::Blob(v) => SqlValue::Blob(v.clone()),
    }
}

/// Converts one result cell.
///
/// # Errors
///
/// Returns [`GatewayError::Conversion`] if a `TEXT` cell is not valid UTF-8.
pub(crate) fn from_sql(value: ValueRef<'_>) -> Result<Value> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        ValueRef::Text(bytes) => Value::Text(
            std::str::from_utf8(bytes)
                .map_err(|e| GatewayError::Conversion(format!("invalid UTF-8 in text cell: {e}")))?
                .to_string(),
        ),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    })
}

/// Reads a whole result row, keyed by the statement's column names.
pub(crate) fn read_row(row: &rusqlite::Row<'_>, names: &[String]) -> Result<Row> {
    let mut out = Row::with_capacity(names.len());
    for (index, name) in names.iter().enumerate() {
        out.insert(name.as_str(), from_sql(row.get_ref(index)?)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_to_sql_variants() {
        assert_eq!(to_sql(&Value::Null), SqlValue::Null);
        assert_eq!(to_sql(&Value::Integer(3)), SqlValue::Integer(3));
        assert_eq!(to_sql(&Value::from("x")), SqlValue::Text("x".into()));
        assert_eq!(to_sql(&Value::Blob(vec![1])), SqlValue::Blob(vec![1]));
    }

    #[test]
    fn test_read_row_preserves_column_order() {
        let conn = Connection::open_in_memory().unwrap();
        let mut stmt = conn
            .prepare("SELECT 2 AS b, 'two' AS a, NULL AS c, 1.5 AS d, x'0102' AS e")
            .unwrap();
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query([]).unwrap();
        let row = rows.next().unwrap().unwrap();

        let read = read_row(row, &names).unwrap();
        assert_eq!(read.keys().collect::<Vec<_>>(), vec!["b", "a", "c", "d", "e"]);
        assert_eq!(read.get("b"), Some(&Value::Integer(2)));
        assert_eq!(read.get("a"), Some(&Value::from("two")));
        assert_eq!(read.get("c"), Some(&Value::Null));
        assert_eq!(read.get("d"), Some(&Value::Real(1.5)));
        assert_eq!(read.get("e"), Some(&Value::Blob(vec![1, 2])));
    }
}

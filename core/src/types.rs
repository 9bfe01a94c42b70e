//! Schema descriptor and row value definitions.
//!
//! This module defines the data model shared by every rowgate backend: scalar
//! [`Value`]s, ordered [`Row`]s, column declarations ([`ColumnDef`]) and the
//! per-table [`TableSchema`] descriptor. The types serialize with [`serde`]
//! so descriptors can be declared in JSON or YAML files as well as in code.

use std::fmt;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Primary key column used when a descriptor does not name one.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Version tag used when a descriptor does not carry one.
pub const DEFAULT_TABLE_VERSION: &str = "1.0";

/// A single scalar cell value.
///
/// Mirrors the storage classes of SQL engines. Booleans are stored as
/// integers (`0`/`1`) when deserialized.
///
/// # Examples
///
/// ```
/// use rowgate_core::Value;
///
/// assert_eq!(Value::from(42), Value::Integer(42));
/// assert_eq!(Value::from("alice"), Value::Text("alice".into()));
/// assert_eq!(Value::from(None::<i64>), Value::Null);
/// assert_eq!(Value::from(true), Value::Integer(1));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// SQL `NULL`.
    #[default]
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Blob(Vec<u8>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the integer payload, if this is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a float view of numeric values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Real(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text payload, if this is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Storage class name, used in validation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::Blob(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Real(f64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Integer(v) => serializer.serialize_i64(*v),
            Value::Real(v) => serializer.serialize_f64(*v),
            Value::Text(v) => serializer.serialize_str(v),
            Value::Blob(v) => serializer.serialize_bytes(v),
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a null, boolean, number, string or byte array")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(i64::try_from(v).map_or(Value::Real(v as f64), Value::Integer))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Real(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::Text(v))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Value, E> {
        Ok(Value::Blob(v.to_vec()))
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Value, E> {
        Ok(Value::Blob(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(byte) = seq.next_element::<u8>()? {
            bytes.push(byte);
        }
        Ok(Value::Blob(bytes))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

/// Canonical form of a caller-supplied column key.
///
/// Descriptor column names are lowercase identifiers, so caller keys are
/// folded with ASCII lowercase before any whitelist lookup.
///
/// # Examples
///
/// ```
/// use rowgate_core::canonical_key;
///
/// assert_eq!(canonical_key("Status"), "status");
/// assert_eq!(canonical_key("total"), "total");
/// ```
pub fn canonical_key(key: &str) -> String {
    key.to_ascii_lowercase()
}

/// An ordered mapping of column name to [`Value`].
///
/// Iteration follows insertion order. Inserting a key that already exists
/// replaces its value in place, so the key keeps the position of its first
/// insertion.
///
/// # Examples
///
/// ```
/// use rowgate_core::{Row, Value};
///
/// let mut row = Row::new().with("customer", "alice").with("total", 9.99);
/// row.insert("customer", "bob");
///
/// assert_eq!(row.keys().collect::<Vec<_>>(), vec!["customer", "total"]);
/// assert_eq!(row.get("customer"), Some(&Value::from("bob")));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    entries: Vec<(String, Value)>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty row with room for `capacity` columns.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces a column value, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Returns the value stored for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    /// Removes `key`, preserving the order of the remaining columns.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Returns `true` if the row has a value for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Number of columns in the row.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(column, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates column names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterates values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        row.extend(iter);
        row
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Row {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct RowVisitor;

impl<'de> Visitor<'de> for RowVisitor {
    type Value = Row;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of column names to scalar values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Row, A::Error> {
        let mut row = Row::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            row.insert(key, value);
        }
        Ok(row)
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RowVisitor)
    }
}

/// Bind format of a whitelisted column.
///
/// The format decides how a value is coerced before it is bound to a
/// statement placeholder, and carries the classic `%d`/`%f`/`%s` marker.
///
/// # Examples
///
/// ```
/// use rowgate_core::{ColumnFormat, Value};
///
/// assert_eq!(ColumnFormat::Integer.symbol(), "%d");
/// assert_eq!(ColumnFormat::Integer.coerce(Value::from("42")), Value::Integer(42));
/// assert_eq!(ColumnFormat::Text.coerce(Value::from(7)), Value::from("7"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColumnFormat {
    /// Integer placeholder (`%d`).
    #[serde(alias = "%d")]
    Integer,
    /// Float placeholder (`%f`).
    #[serde(alias = "%f")]
    Float,
    /// String placeholder (`%s`), the default.
    #[default]
    #[serde(alias = "%s")]
    Text,
}

impl ColumnFormat {
    /// Returns the printf-style marker for this format.
    pub fn symbol(self) -> &'static str {
        match self {
            ColumnFormat::Integer => "%d",
            ColumnFormat::Float => "%f",
            ColumnFormat::Text => "%s",
        }
    }

    /// Converts `value` to this format.
    ///
    /// `Null` and `Blob` pass through unchanged. Text that does not parse as
    /// a number becomes `0` for numeric formats.
    pub fn coerce(self, value: Value) -> Value {
        match (self, value) {
            (_, Value::Null) => Value::Null,
            (_, Value::Blob(bytes)) => Value::Blob(bytes),
            (ColumnFormat::Integer, Value::Integer(v)) => Value::Integer(v),
            (ColumnFormat::Integer, Value::Real(v)) => Value::Integer(v as i64),
            (ColumnFormat::Integer, Value::Text(s)) => Value::Integer(parse_integer(&s)),
            (ColumnFormat::Float, Value::Integer(v)) => Value::Real(v as f64),
            (ColumnFormat::Float, Value::Real(v)) => Value::Real(v),
            (ColumnFormat::Float, Value::Text(s)) => Value::Real(s.trim().parse().unwrap_or(0.0)),
            (ColumnFormat::Text, Value::Integer(v)) => Value::Text(v.to_string()),
            (ColumnFormat::Text, Value::Real(v)) => Value::Text(v.to_string()),
            (ColumnFormat::Text, Value::Text(s)) => Value::Text(s),
        }
    }
}

fn parse_integer(text: &str) -> i64 {
    let trimmed = text.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().map(|v| v as i64))
        .unwrap_or(0)
}

/// Declared SQL type of a column.
///
/// Known names are matched case-insensitively; anything else is kept
/// verbatim as [`ColumnType::Custom`] (e.g. `VARCHAR(64)`).
///
/// # Examples
///
/// ```
/// use rowgate_core::{ColumnFormat, ColumnType};
///
/// assert_eq!(ColumnType::from("integer".to_string()), ColumnType::Integer);
/// assert_eq!(ColumnType::Real.default_format(), ColumnFormat::Float);
///
/// let custom = ColumnType::from("BIGINT UNSIGNED".to_string());
/// assert_eq!(custom.sql_name(), "BIGINT UNSIGNED");
/// assert_eq!(custom.default_format(), ColumnFormat::Integer);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Blob,
    Numeric,
    /// Engine-specific declaration, rendered as written.
    Custom(String),
}

impl ColumnType {
    /// SQL spelling used in DDL.
    pub fn sql_name(&self) -> &str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
            ColumnType::Blob => "BLOB",
            ColumnType::Numeric => "NUMERIC",
            ColumnType::Custom(decl) => decl.as_str(),
        }
    }

    /// Bind format implied by the type, following SQL affinity rules for
    /// custom declarations.
    pub fn default_format(&self) -> ColumnFormat {
        match self {
            ColumnType::Integer => ColumnFormat::Integer,
            ColumnType::Real | ColumnType::Numeric => ColumnFormat::Float,
            ColumnType::Text | ColumnType::Blob => ColumnFormat::Text,
            ColumnType::Custom(decl) => {
                let upper = decl.to_ascii_uppercase();
                if upper.contains("INT") {
                    ColumnFormat::Integer
                } else if ["REAL", "FLOA", "DOUB", "DEC", "NUM"]
                    .iter()
                    .any(|marker| upper.contains(marker))
                {
                    ColumnFormat::Float
                } else {
                    ColumnFormat::Text
                }
            }
        }
    }
}

impl From<String> for ColumnType {
    fn from(name: String) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "INTEGER" | "INT" => ColumnType::Integer,
            "REAL" | "FLOAT" | "DOUBLE" => ColumnType::Real,
            "TEXT" | "STRING" => ColumnType::Text,
            "BLOB" => ColumnType::Blob,
            "NUMERIC" => ColumnType::Numeric,
            _ => ColumnType::Custom(name.trim().to_string()),
        }
    }
}

impl From<ColumnType> for String {
    fn from(ty: ColumnType) -> Self {
        ty.sql_name().to_string()
    }
}

fn default_true() -> bool {
    true
}

/// Declaration of one whitelisted column.
///
/// Use the constructors ([`integer`](ColumnDef::integer),
/// [`text`](ColumnDef::text), ...) and chain the builder methods.
///
/// # Examples
///
/// ```
/// use rowgate_core::{ColumnDef, ColumnFormat, Value};
///
/// let status = ColumnDef::text("status").not_null().with_default("pending");
/// assert_eq!(status.format(), ColumnFormat::Text);
/// assert!(!status.nullable);
/// assert_eq!(status.default, Some(Value::from("pending")));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Canonical (lowercase) column name.
    pub name: String,
    /// Declared SQL type.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Explicit bind format; falls back to the type's default format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ColumnFormat>,
    /// Whether the column accepts `NULL`.
    #[serde(default = "default_true")]
    pub nullable: bool,
    /// Value used when an insert omits the column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Engine-generated key.
    #[serde(default)]
    pub auto_increment: bool,
    /// Column carries a uniqueness constraint.
    #[serde(default)]
    pub unique: bool,
}

impl ColumnDef {
    /// Creates a nullable column of the given type.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            format: None,
            nullable: true,
            default: None,
            auto_increment: false,
            unique: false,
        }
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Integer)
    }

    pub fn real(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Real)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Text)
    }

    pub fn blob(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Blob)
    }

    /// Marks the column `NOT NULL`.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets the insert default.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Overrides the bind format implied by the column type.
    pub fn with_format(mut self, format: ColumnFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Marks the column as engine-generated.
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Adds a uniqueness constraint.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Effective bind format.
    pub fn format(&self) -> ColumnFormat {
        self.format.unwrap_or_else(|| self.column_type.default_format())
    }
}

/// Secondary index declared on a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDef {
    /// Index name.
    pub name: String,
    /// Indexed columns, in key order.
    pub columns: Vec<String>,
    /// Whether the index enforces uniqueness.
    #[serde(default)]
    pub unique: bool,
}

impl IndexDef {
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
        }
    }

    /// Marks the index unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

fn default_primary_key() -> String {
    DEFAULT_PRIMARY_KEY.to_string()
}

fn default_version() -> String {
    DEFAULT_TABLE_VERSION.to_string()
}

/// Schema descriptor for one managed table.
///
/// The descriptor is the single source of truth for the table name, primary
/// key, version tag, the whitelist of writable columns with their bind
/// formats, and insert defaults. Descriptors are built once and treated as
/// immutable afterwards.
///
/// # Examples
///
/// ```
/// use rowgate_core::*;
///
/// let orders = TableSchema::new("orders")
///     .with_column(ColumnDef::integer("id").not_null().auto_increment())
///     .with_column(ColumnDef::text("customer").not_null())
///     .with_column(ColumnDef::real("total"))
///     .with_column(ColumnDef::text("status").with_default("pending"));
///
/// assert_eq!(orders.primary_key, "id");
/// assert_eq!(orders.columns()[2], ("total", ColumnFormat::Float));
/// assert_eq!(orders.defaults().get("status"), Some(&Value::from("pending")));
/// assert!(orders.is_writable("customer"));
/// assert!(!orders.is_writable("password"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name.
    pub name: String,
    /// Primary key column.
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    /// Informational version tag.
    #[serde(default = "default_version")]
    pub version: String,
    /// Whitelisted columns in declaration order.
    pub columns: Vec<ColumnDef>,
    /// Secondary indexes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<IndexDef>,
}

impl TableSchema {
    /// Creates a descriptor with no columns, primary key `id` and version `1.0`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_key: default_primary_key(),
            version: default_version(),
            columns: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Sets the primary key column name.
    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    /// Sets the version tag.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Appends a column to the whitelist.
    pub fn with_column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends a secondary index.
    pub fn with_index(mut self, index: IndexDef) -> Self {
        self.indexes.push(index);
        self
    }

    /// Whitelist of writable columns with their bind formats, in
    /// declaration order. Empty when no columns are declared.
    pub fn columns(&self) -> Vec<(&str, ColumnFormat)> {
        self.columns
            .iter()
            .map(|column| (column.name.as_str(), column.format()))
            .collect()
    }

    /// Insert defaults for every column that declares one.
    pub fn defaults(&self) -> Row {
        self.columns
            .iter()
            .filter_map(|column| {
                column
                    .default
                    .as_ref()
                    .map(|value| (column.name.clone(), value.clone()))
            })
            .collect()
    }

    /// Looks up a whitelisted column by exact (canonical) name.
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Returns `true` if `name` is whitelisted.
    pub fn is_writable(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Declared column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    /// Declaration of the primary key column, if it is whitelisted.
    pub fn primary_key_column(&self) -> Option<&ColumnDef> {
        self.column(&self.primary_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders() -> TableSchema {
        TableSchema::new("orders")
            .with_column(ColumnDef::integer("id").not_null().auto_increment())
            .with_column(ColumnDef::text("customer").not_null())
            .with_column(ColumnDef::real("total"))
            .with_column(ColumnDef::text("status").with_default("pending"))
    }

    #[test]
    fn test_row_insert_replaces_in_place() {
        let mut row = Row::new().with("a", 1).with("b", 2).with("c", 3);
        let previous = row.insert("b", 20);
        assert_eq!(previous, Some(Value::Integer(2)));
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(row.get("b"), Some(&Value::Integer(20)));
    }

    #[test]
    fn test_row_remove_keeps_order() {
        let mut row = Row::new().with("a", 1).with("b", 2).with("c", 3);
        assert_eq!(row.remove("b"), Some(Value::Integer(2)));
        assert_eq!(row.remove("missing"), None);
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn test_row_json_preserves_document_order() {
        let row: Row = serde_json::from_str(r#"{"zeta": 1, "alpha": "x", "mid": null}"#).unwrap();
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(row.get("mid"), Some(&Value::Null));

        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"zeta":1,"alpha":"x","mid":null}"#);
    }

    #[test]
    fn test_value_deserialize_kinds() {
        let row: Row =
            serde_json::from_str(r#"{"i": 5, "f": 9.99, "s": "hi", "b": true, "n": null}"#)
                .unwrap();
        assert_eq!(row.get("i"), Some(&Value::Integer(5)));
        assert_eq!(row.get("f"), Some(&Value::Real(9.99)));
        assert_eq!(row.get("s"), Some(&Value::from("hi")));
        assert_eq!(row.get("b"), Some(&Value::Integer(1)));
        assert_eq!(row.get("n"), Some(&Value::Null));
    }

    #[test]
    fn test_format_coercion() {
        assert_eq!(ColumnFormat::Integer.coerce(Value::Real(3.7)), Value::Integer(3));
        assert_eq!(ColumnFormat::Integer.coerce(Value::from("abc")), Value::Integer(0));
        assert_eq!(ColumnFormat::Integer.coerce(Value::from(" 12 ")), Value::Integer(12));
        assert_eq!(ColumnFormat::Float.coerce(Value::Integer(2)), Value::Real(2.0));
        assert_eq!(ColumnFormat::Float.coerce(Value::from("1.5")), Value::Real(1.5));
        assert_eq!(ColumnFormat::Text.coerce(Value::Real(9.5)), Value::from("9.5"));
        assert_eq!(ColumnFormat::Text.coerce(Value::Null), Value::Null);
    }

    #[test]
    fn test_format_serde_accepts_symbols() {
        let format: ColumnFormat = serde_json::from_str(r#""%d""#).unwrap();
        assert_eq!(format, ColumnFormat::Integer);
        let format: ColumnFormat = serde_json::from_str(r#""float""#).unwrap();
        assert_eq!(format, ColumnFormat::Float);
    }

    #[test]
    fn test_empty_descriptor_has_empty_whitelist() {
        let schema = TableSchema::new("empty");
        assert!(schema.columns().is_empty());
        assert!(schema.defaults().is_empty());
        assert!(schema.primary_key_column().is_none());
    }

    #[test]
    fn test_descriptor_views() {
        let schema = orders();
        assert_eq!(
            schema.columns(),
            vec![
                ("id", ColumnFormat::Integer),
                ("customer", ColumnFormat::Text),
                ("total", ColumnFormat::Float),
                ("status", ColumnFormat::Text),
            ]
        );
        assert_eq!(schema.defaults(), Row::new().with("status", "pending"));
        assert!(schema.primary_key_column().unwrap().auto_increment);
    }

    #[test]
    fn test_descriptor_yaml() {
        let yaml = r#"
name: orders
version: "2.1"
columns:
  - { name: id, type: integer, nullable: false, auto_increment: true }
  - { name: customer, type: "VARCHAR(64)" }
  - { name: total, type: real }
  - { name: status, type: text, default: pending }
"#;
        let schema: TableSchema = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(schema.primary_key, "id");
        assert_eq!(schema.version, "2.1");
        assert_eq!(
            schema.column("customer").unwrap().column_type,
            ColumnType::Custom("VARCHAR(64)".into())
        );
        assert_eq!(schema.column("customer").unwrap().format(), ColumnFormat::Text);
        assert_eq!(schema.defaults().get("status"), Some(&Value::from("pending")));
    }
}

use serde::{Deserialize, Serialize};

use crate::TableSchema;

/// Serializable bundle of table descriptors.
///
/// A package declares every table an application manages in one file, so a
/// schema manager can register them together.
///
/// # Examples
///
/// ```
/// use rowgate_core::*;
///
/// let mut package = TablePackage::new("1.0.0");
/// package.name = Some("shop".into());
/// package.tables.push(TableSchema::new("orders").with_column(ColumnDef::integer("id")));
/// package.tables.push(TableSchema::new("customers").with_column(ColumnDef::integer("id")));
///
/// assert_eq!(package.table_count(), 2);
/// assert!(package.table("orders").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePackage {
    /// Package format version.
    pub version: String,
    /// Optional package name.
    #[serde(default)]
    pub name: Option<String>,
    /// Optional package description.
    #[serde(default)]
    pub description: Option<String>,
    /// Table descriptors in registration order.
    #[serde(default)]
    pub tables: Vec<TableSchema>,
}

impl TablePackage {
    /// Creates an empty package.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            name: None,
            description: None,
            tables: Vec::new(),
        }
    }

    /// Returns the number of tables in this package.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Looks up a descriptor by table name.
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|table| table.name == name)
    }
}

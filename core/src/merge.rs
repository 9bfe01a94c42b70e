//! Defaults merging and whitelist filtering for write payloads.
//!
//! Writes go through two steps before any statement is built: caller data is
//! laid over the descriptor's defaults ([`merge_defaults`]), then keys are
//! canonicalised and everything outside the whitelist is dropped
//! ([`TableSchema::filter`]). Unknown keys are never an error.
//!
//! # Example
//!
//! ```
//! use rowgate_core::*;
//!
//! let schema = TableSchema::new("orders")
//!     .with_column(ColumnDef::integer("id"))
//!     .with_column(ColumnDef::text("customer"))
//!     .with_column(ColumnDef::text("status").with_default("pending"));
//!
//! let data = Row::new().with("Customer", "alice").with("is_admin", 1);
//! let merged = merge_defaults(&schema.defaults(), &data);
//! let filtered = schema.filter(&merged);
//!
//! assert_eq!(filtered, Row::new().with("status", "pending").with("customer", "alice"));
//! ```

use crate::{Row, TableSchema, canonical_key};

/// Lays `data` over `defaults`.
///
/// Caller values win on conflicting keys and defaults fill the gaps. The
/// result iterates the defaults' keys first, then keys only present in
/// `data`, in caller order.
///
/// # Examples
///
/// ```
/// use rowgate_core::{Row, merge_defaults};
///
/// let defaults = Row::new().with("status", "pending");
///
/// let merged = merge_defaults(&defaults, &Row::new().with("customer", "alice"));
/// assert_eq!(merged, Row::new().with("status", "pending").with("customer", "alice"));
///
/// let merged = merge_defaults(&defaults, &Row::new().with("status", "done"));
/// assert_eq!(merged, Row::new().with("status", "done"));
/// ```
pub fn merge_defaults(defaults: &Row, data: &Row) -> Row {
    let mut merged = defaults.clone();
    for (key, value) in data.iter() {
        merged.insert(key, value.clone());
    }
    merged
}

impl TableSchema {
    /// Canonicalises keys and keeps only whitelisted columns.
    ///
    /// The result follows `data`'s iteration order. When two caller keys
    /// fold to the same canonical key, the later value wins and keeps the
    /// earlier position.
    pub fn filter(&self, data: &Row) -> Row {
        let mut filtered = Row::with_capacity(data.len());
        for (key, value) in data.iter() {
            let key = canonical_key(key);
            if self.is_writable(&key) {
                filtered.insert(key, value.clone());
            }
        }
        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColumnDef, Value};

    fn schema() -> TableSchema {
        TableSchema::new("orders")
            .with_column(ColumnDef::integer("id"))
            .with_column(ColumnDef::text("customer"))
            .with_column(ColumnDef::real("total"))
            .with_column(ColumnDef::text("status").with_default("pending"))
    }

    #[test]
    fn test_merge_caller_wins() {
        let defaults = Row::new().with("status", "pending").with("total", 0.0);
        let data = Row::new().with("customer", "bob").with("status", "done");
        let merged = merge_defaults(&defaults, &data);
        assert_eq!(
            merged,
            Row::new()
                .with("status", "done")
                .with("total", 0.0)
                .with("customer", "bob")
        );
    }

    #[test]
    fn test_merge_with_empty_defaults() {
        let data = Row::new().with("b", 1).with("a", 2);
        assert_eq!(merge_defaults(&Row::new(), &data), data);
    }

    #[test]
    fn test_filter_drops_unknown_keys() {
        let data = Row::new()
            .with("total", 5)
            .with("role", "admin")
            .with("customer", "carol");
        let filtered = schema().filter(&data);
        assert_eq!(filtered.keys().collect::<Vec<_>>(), vec!["total", "customer"]);
    }

    #[test]
    fn test_filter_follows_payload_order_not_whitelist_order() {
        let data = Row::new()
            .with("status", "new")
            .with("total", 1)
            .with("customer", "dan");
        let filtered = schema().filter(&data);
        assert_eq!(
            filtered.keys().collect::<Vec<_>>(),
            vec!["status", "total", "customer"]
        );
    }

    #[test]
    fn test_filter_folds_case_variants() {
        let data = Row::new()
            .with("STATUS", "a")
            .with("Customer", "erin")
            .with("status", "b");
        let filtered = schema().filter(&data);
        assert_eq!(filtered.keys().collect::<Vec<_>>(), vec!["status", "customer"]);
        assert_eq!(filtered.get("status"), Some(&Value::from("b")));
    }

    #[test]
    fn test_filter_against_empty_whitelist() {
        let data = Row::new().with("anything", 1);
        assert!(TableSchema::new("bare").filter(&data).is_empty());
    }
}

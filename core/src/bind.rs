//! Positional bind sequences for parameterised statements.
//!
//! A [`BindSequence`] is built in one traversal of a write payload: each
//! whitelisted entry yields the statement column, the coerced value and its
//! format together, so the column list and the positional arguments can
//! never disagree on order.

use crate::{ColumnFormat, Row, TableSchema, Value, canonical_key};

/// One positional argument of a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Bind {
    /// Canonical column name.
    pub column: String,
    /// Value coerced to `format`.
    pub value: Value,
    /// Bind format taken from the descriptor.
    pub format: ColumnFormat,
}

/// Ordered list of binds derived from a payload.
///
/// Length and order match the filtered payload exactly; the whitelist's
/// declaration order plays no part.
///
/// # Examples
///
/// ```
/// use rowgate_core::*;
///
/// let schema = TableSchema::new("orders")
///     .with_column(ColumnDef::integer("id"))
///     .with_column(ColumnDef::text("customer"))
///     .with_column(ColumnDef::real("total"));
///
/// let data = Row::new().with("total", "9.99").with("nope", 1).with("customer", "alice");
/// let binds = BindSequence::build(&schema, &data);
///
/// assert_eq!(binds.columns(), vec!["total", "customer"]);
/// assert_eq!(binds.formats(), vec![ColumnFormat::Float, ColumnFormat::Text]);
/// assert_eq!(binds.values()[0], &Value::Real(9.99));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindSequence {
    binds: Vec<Bind>,
}

impl BindSequence {
    /// Builds the sequence from `data`, dropping keys outside the whitelist.
    pub fn build(schema: &TableSchema, data: &Row) -> Self {
        let mut binds: Vec<Bind> = Vec::with_capacity(data.len());
        for (key, value) in data.iter() {
            let key = canonical_key(key);
            let Some(column) = schema.column(&key) else {
                continue;
            };
            let format = column.format();
            let value = format.coerce(value.clone());
            match binds.iter_mut().find(|bind| bind.column == key) {
                Some(existing) => existing.value = value,
                None => binds.push(Bind {
                    column: key,
                    value,
                    format,
                }),
            }
        }
        Self { binds }
    }

    pub fn len(&self) -> usize {
        self.binds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.binds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bind> {
        self.binds.iter()
    }

    /// Statement columns in positional order.
    pub fn columns(&self) -> Vec<&str> {
        self.binds.iter().map(|bind| bind.column.as_str()).collect()
    }

    /// Bound values in positional order.
    pub fn values(&self) -> Vec<&Value> {
        self.binds.iter().map(|bind| &bind.value).collect()
    }

    /// Formats in positional order.
    pub fn formats(&self) -> Vec<ColumnFormat> {
        self.binds.iter().map(|bind| bind.format).collect()
    }

    /// Consumes the sequence, returning the positional values.
    pub fn into_values(self) -> Vec<Value> {
        self.binds.into_iter().map(|bind| bind.value).collect()
    }

    /// The payload as it will be written.
    pub fn to_row(&self) -> Row {
        self.binds
            .iter()
            .map(|bind| (bind.column.clone(), bind.value.clone()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a BindSequence {
    type Item = &'a Bind;
    type IntoIter = std::slice::Iter<'a, Bind>;

    fn into_iter(self) -> Self::IntoIter {
        self.binds.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ColumnDef;

    fn schema() -> TableSchema {
        TableSchema::new("orders")
            .with_column(ColumnDef::integer("id"))
            .with_column(ColumnDef::text("customer"))
            .with_column(ColumnDef::real("total"))
            .with_column(ColumnDef::text("status"))
    }

    #[test]
    fn test_sequence_matches_filtered_payload() {
        let data = Row::new()
            .with("status", "shipped")
            .with("x", 1)
            .with("ID", "7")
            .with("customer", "frank");
        let schema = schema();
        let binds = BindSequence::build(&schema, &data);
        let filtered = schema.filter(&data);

        assert_eq!(binds.len(), filtered.len());
        assert_eq!(binds.columns(), filtered.keys().collect::<Vec<_>>());
        assert_eq!(
            binds.formats(),
            vec![ColumnFormat::Text, ColumnFormat::Integer, ColumnFormat::Text]
        );
        assert_eq!(binds.values()[1], &Value::Integer(7));
    }

    #[test]
    fn test_sequence_collapses_case_variants() {
        let data = Row::new().with("Total", 1).with("TOTAL", 2.5);
        let binds = BindSequence::build(&schema(), &data);
        assert_eq!(binds.len(), 1);
        assert_eq!(binds.to_row(), Row::new().with("total", 2.5));
    }

    #[test]
    fn test_empty_payload() {
        let binds = BindSequence::build(&schema(), &Row::new().with("ghost", 1));
        assert!(binds.is_empty());
        assert!(binds.into_values().is_empty());
    }
}

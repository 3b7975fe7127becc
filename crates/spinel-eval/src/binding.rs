//! The pivot row: a binding from `(table, column)` to a concrete value.

use std::collections::HashMap;

use crate::schema::{ColumnName, TableColumn, TableName};
use crate::value::Value;

/// One hypothesized row, possibly spanning a join of several tables,
/// expressed as a mapping from [`TableColumn`] to a concrete [`Value`].
///
/// `Value::Null` is the NULL sentinel. A column referenced by the
/// predicate but absent from the binding is an evaluation error, never a
/// silent default — the invariant the whole oracle rests on is that the
/// binding fully describes the pivot row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowBinding {
    values: HashMap<TableColumn, Value>,
}

impl RowBinding {
    /// Creates an empty binding.
    pub fn new() -> RowBinding {
        RowBinding::default()
    }

    /// Adds a column value, builder style.
    pub fn bind(
        mut self,
        table: impl Into<TableName>,
        column: impl Into<ColumnName>,
        value: impl Into<Value>,
    ) -> RowBinding {
        self.insert(TableColumn::new(table, column), value.into());
        self
    }

    /// Adds a column value in place.
    pub fn insert(&mut self, key: TableColumn, value: Value) {
        self.values.insert(key, value);
    }

    /// Looks up the value bound to a column.
    pub fn get(&self, key: &TableColumn) -> Option<&Value> {
        self.values.get(key)
    }

    /// Number of bound columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the bound columns.
    pub fn iter(&self) -> impl Iterator<Item = (&TableColumn, &Value)> {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_and_lookup_are_case_insensitive() {
        let row = RowBinding::new()
            .bind("T0", "C0", Value::Int(1))
            .bind("t0", "c1", Value::Null);
        assert_eq!(row.len(), 2);
        assert_eq!(
            row.get(&TableColumn::new("t0", "c0")),
            Some(&Value::Int(1))
        );
        assert!(row.get(&TableColumn::new("t0", "c1")).unwrap().is_null());
        assert_eq!(row.get(&TableColumn::new("t1", "c0")), None);
    }
}

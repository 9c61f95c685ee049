//! Record types for query execution.
//!
//! A [`Record`] is the unit of data flowing between operators: one slot per
//! column of the plan layout, each slot either unset or bound to a
//! [`Value`]. Records have exactly one owner; returning one from
//! `consume()` hands it to the caller, and dropping it releases it.

use std::collections::HashMap;
use std::sync::Arc;

use quiver_core::Value;

use crate::error::{ExecError, ExecResult};

/// A schema defines the column names and their order in a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Column names in order.
    columns: Vec<Arc<str>>,
    /// Map from column name to index for fast lookup.
    name_to_index: HashMap<Arc<str>, usize>,
}

impl Schema {
    /// Creates a new schema from column names.
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        Self::from_arcs(columns.into_iter().map(|s| Arc::from(s.as_str())).collect())
    }

    /// Creates a new schema from `Arc<str>` column names.
    #[must_use]
    pub fn from_arcs(columns: Vec<Arc<str>>) -> Self {
        let name_to_index =
            columns.iter().enumerate().map(|(i, name)| (Arc::clone(name), i)).collect();
        Self { columns, name_to_index }
    }

    /// Creates an empty schema.
    #[must_use]
    pub fn empty() -> Self {
        Self { columns: Vec::new(), name_to_index: HashMap::new() }
    }

    /// Returns the column names as string slices.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        self.columns.iter().map(|s| s.as_ref()).collect()
    }

    /// Returns the `Arc<str>` column names.
    #[must_use]
    pub fn columns_arc(&self) -> &[Arc<str>] {
        &self.columns
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the schema has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Gets the index for a column name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Gets the column name at an index.
    #[must_use]
    pub fn column_at(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(|s| s.as_ref())
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<&str>> for Schema {
    fn from(columns: Vec<&str>) -> Self {
        Self::new(columns.into_iter().map(String::from).collect())
    }
}

/// A row of bound variable values.
///
/// Column `i` holds the binding of the variable registered at index `i` of
/// the owning plan. Unset slots are `None`; an explicit null binding is
/// `Some(Value::Null)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// The layout this record is shaped by.
    schema: Arc<Schema>,
    /// One slot per schema column.
    values: Vec<Option<Value>>,
}

impl Record {
    /// Creates a record with every slot unset.
    #[must_use]
    pub fn new(schema: Arc<Schema>) -> Self {
        let values = vec![None; schema.len()];
        Self { schema, values }
    }

    /// Creates a record with every slot bound.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the number of values doesn't match the schema.
    #[must_use]
    pub fn with_values(schema: Arc<Schema>, values: Vec<Value>) -> Self {
        debug_assert_eq!(
            schema.len(),
            values.len(),
            "Record values count must match schema column count"
        );
        Self { schema, values: values.into_iter().map(Some).collect() }
    }

    /// Returns the schema of this record.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the shared schema reference.
    #[must_use]
    pub fn schema_arc(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    /// Returns the number of column slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the record has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Gets the value bound at a column, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index).and_then(Option::as_ref)
    }

    /// Gets the value bound to a column name, if any.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.schema.index_of(name).and_then(|i| self.get(i))
    }

    /// Returns true if the slot at `index` is bound.
    #[must_use]
    pub fn is_bound(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Number of bound slots.
    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Binds a value at a column, returning the previous binding.
    pub fn set(&mut self, index: usize, value: Value) -> Option<Value> {
        debug_assert!(index < self.values.len(), "column {index} outside record layout");
        self.values.get_mut(index).and_then(|slot| slot.replace(value))
    }

    /// Clears the slot at `index`, returning its binding.
    pub fn unset(&mut self, index: usize) -> Option<Value> {
        self.values.get_mut(index).and_then(Option::take)
    }

    /// Returns true if `other` uses the same column layout.
    #[must_use]
    pub fn same_layout(&self, other: &Record) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema) || self.schema == other.schema
    }

    /// Moves every bound slot of `other` into this record.
    ///
    /// Bound slots of `other` overwrite this record's slots; unset slots
    /// leave them untouched. Both records must share a layout.
    pub fn merge(&mut self, other: Record) -> ExecResult<()> {
        if !self.same_layout(&other) {
            return Err(ExecError::layout_mismatch(
                &self.schema.columns(),
                &other.schema.columns(),
            ));
        }
        for (slot, value) in self.values.iter_mut().zip(other.values) {
            if value.is_some() {
                *slot = value;
            }
        }
        Ok(())
    }

    /// Translates this record into another layout.
    #[must_use]
    pub fn remap(self, map: &ColumnMap) -> Self {
        map.apply(self)
    }

    /// Consumes the record and returns its slots.
    #[must_use]
    pub fn into_values(self) -> Vec<Option<Value>> {
        self.values
    }

    /// Converts the bound slots to a map of column names to values.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, Value> {
        self.schema
            .columns_arc()
            .iter()
            .zip(self.values.iter())
            .filter_map(|(name, value)| value.as_ref().map(|v| (name.to_string(), v.clone())))
            .collect()
    }
}

/// Translation of column positions from one layout to another.
///
/// Columns are matched by variable name. Source columns missing from the
/// target are dropped; target columns missing from the source stay unset.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    source: Arc<Schema>,
    target: Arc<Schema>,
    /// `positions[i]` is the target column of source column `i`.
    positions: Vec<Option<usize>>,
}

impl ColumnMap {
    /// Computes the map from `source` to `target`.
    #[must_use]
    pub fn new(source: Arc<Schema>, target: Arc<Schema>) -> Self {
        let positions =
            source.columns_arc().iter().map(|name| target.index_of(name)).collect::<Vec<_>>();
        Self { source, target, positions }
    }

    /// The layout records are translated from.
    #[must_use]
    pub fn source(&self) -> &Arc<Schema> {
        &self.source
    }

    /// The layout records are translated into.
    #[must_use]
    pub fn target(&self) -> &Arc<Schema> {
        &self.target
    }

    /// Returns true if this map was built for records shaped by `schema`.
    #[must_use]
    pub fn applies_to(&self, schema: &Arc<Schema>) -> bool {
        Arc::ptr_eq(&self.source, schema) || self.source == *schema
    }

    /// Returns true if translation leaves every column in place.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.source.len() == self.target.len()
            && self.positions.iter().enumerate().all(|(i, p)| *p == Some(i))
    }

    /// Translates a record shaped by the source layout.
    #[must_use]
    pub fn apply(&self, record: Record) -> Record {
        debug_assert!(self.applies_to(&record.schema), "column map applied to foreign layout");
        let mut values = vec![None; self.target.len()];
        for (value, position) in record.values.into_iter().zip(&self.positions) {
            if let Some(target) = position {
                values[*target] = value;
            }
        }
        Record { schema: Arc::clone(&self.target), values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(columns: &[&str]) -> Arc<Schema> {
        Arc::new(Schema::from(columns.to_vec()))
    }

    #[test]
    fn schema_basic() {
        let schema = Schema::new(vec!["n".to_string(), "m".to_string()]);
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.index_of("n"), Some(0));
        assert_eq!(schema.index_of("m"), Some(1));
        assert_eq!(schema.index_of("unknown"), None);
        assert_eq!(schema.column_at(1), Some("m"));
    }

    #[test]
    fn new_record_is_unbound() {
        let record = Record::new(schema(&["a", "b"]));
        assert_eq!(record.len(), 2);
        assert_eq!(record.bound_count(), 0);
        assert!(record.get(0).is_none());
    }

    #[test]
    fn set_and_unset() {
        let mut record = Record::new(schema(&["a", "b"]));
        assert_eq!(record.set(1, Value::Int(7)), None);
        assert_eq!(record.get_by_name("b"), Some(&Value::Int(7)));
        assert_eq!(record.set(1, Value::Int(8)), Some(Value::Int(7)));
        assert_eq!(record.unset(1), Some(Value::Int(8)));
        assert!(!record.is_bound(1));
    }

    #[test]
    fn null_binding_is_bound() {
        let mut record = Record::new(schema(&["a"]));
        record.set(0, Value::Null);
        assert!(record.is_bound(0));
    }

    #[test]
    fn merge_overwrites_bound_slots_only() {
        let layout = schema(&["a", "b", "c"]);
        let mut left = Record::new(Arc::clone(&layout));
        left.set(0, Value::Int(1));
        left.set(1, Value::Int(2));

        let mut right = Record::new(Arc::clone(&layout));
        right.set(1, Value::Int(20));
        right.set(2, Value::Int(30));

        left.merge(right).unwrap();
        assert_eq!(left.get(0), Some(&Value::Int(1)));
        assert_eq!(left.get(1), Some(&Value::Int(20)));
        assert_eq!(left.get(2), Some(&Value::Int(30)));
    }

    #[test]
    fn merge_accepts_equal_layouts_from_distinct_arcs() {
        let mut left = Record::new(schema(&["a"]));
        let right = Record::with_values(schema(&["a"]), vec![Value::Int(5)]);
        left.merge(right).unwrap();
        assert_eq!(left.get(0), Some(&Value::Int(5)));
    }

    #[test]
    fn merge_rejects_foreign_layout() {
        let mut left = Record::new(schema(&["a"]));
        let right = Record::new(schema(&["b"]));
        let err = left.merge(right).unwrap_err();
        assert!(matches!(err, ExecError::LayoutMismatch { .. }));
    }

    #[test]
    fn column_map_translates_by_name() {
        let source = schema(&["x", "y", "dropped"]);
        let target = schema(&["y", "z", "x"]);
        let map = ColumnMap::new(Arc::clone(&source), Arc::clone(&target));
        assert!(!map.is_identity());

        let record = Record::with_values(
            source,
            vec![Value::Int(1), Value::Int(2), Value::Int(3)],
        );
        let remapped = record.remap(&map);
        assert_eq!(remapped.schema().columns(), vec!["y", "z", "x"]);
        assert_eq!(remapped.get(0), Some(&Value::Int(2)));
        assert!(remapped.get(1).is_none());
        assert_eq!(remapped.get(2), Some(&Value::Int(1)));
    }

    #[test]
    fn identity_map() {
        let layout = schema(&["a", "b"]);
        let map = ColumnMap::new(Arc::clone(&layout), Arc::clone(&layout));
        assert!(map.is_identity());
        assert!(map.applies_to(&layout));
        assert!(!map.applies_to(&schema(&["b", "a"])));
    }

    #[test]
    fn to_map_skips_unset() {
        let mut record = Record::new(schema(&["a", "b"]));
        record.set(0, Value::from("x"));
        let map = record.to_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("a"), Some(&Value::from("x")));
    }
}

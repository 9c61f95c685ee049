//! Query result types.

use std::sync::Arc;

use super::record::{Record, Schema};

/// The records produced by one full execution of a plan.
#[derive(Debug, Clone)]
pub struct ResultSet {
    /// The plan layout the records were produced in.
    schema: Arc<Schema>,
    /// The records, in production order.
    records: Vec<Record>,
}

impl ResultSet {
    /// Creates an empty result set.
    #[must_use]
    pub fn new(schema: Arc<Schema>) -> Self {
        Self { schema, records: Vec::new() }
    }

    /// Creates a result set with the given records.
    #[must_use]
    pub fn with_records(schema: Arc<Schema>, records: Vec<Record>) -> Self {
        Self { schema, records }
    }

    /// Returns the schema.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the column names.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        self.schema.columns()
    }

    /// Returns the records.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Adds a record to the result set.
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Gets a record by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Iterates over the records.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Consumes the result set and returns the records.
    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl IntoIterator for ResultSet {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use quiver_core::Value;

    use super::*;

    #[test]
    fn push_and_iterate() {
        let schema = Arc::new(Schema::new(vec!["n".to_string()]));
        let mut rs = ResultSet::new(Arc::clone(&schema));
        assert!(rs.is_empty());

        rs.push(Record::with_values(Arc::clone(&schema), vec![Value::Int(1)]));
        rs.push(Record::with_values(schema, vec![Value::Int(2)]));
        assert_eq!(rs.len(), 2);
        assert_eq!(rs.columns(), vec!["n"]);
        assert_eq!(rs.get(1).and_then(|r| r.get(0)), Some(&Value::Int(2)));

        let values: Vec<i64> =
            rs.into_iter().filter_map(|r| r.get(0).and_then(Value::as_int)).collect();
        assert_eq!(values, vec![1, 2]);
    }
}

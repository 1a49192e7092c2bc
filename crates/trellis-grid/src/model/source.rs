//! Data source adapters.
//!
//! The grid never owns application data; it reads records through the
//! [`DataSource`] trait once per (row, column) pair during row derivation.
//! A missing field resolves to an empty text cell, not an error.
//!
//! [`RecordSet`] is the in-memory implementation used by tests and simple
//! hosts; anything backed by a database or a domain model can implement the
//! trait directly.

use crate::model::cell::Cell;

/// Read-only access to tabular records.
pub trait DataSource: Send + Sync {
    /// Number of records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The field keys this source can serve, in a stable order.
    ///
    /// Used to infer a header when the host supplies data without columns.
    fn field_keys(&self) -> Vec<String>;

    /// The cell for `key` in record `record`, or `None` when the record has
    /// no such field.
    fn cell(&self, record: usize, key: &str) -> Option<Cell>;
}

/// One record: field keys mapped to cell content, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: Vec<(String, Cell)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field. Later writes to the same key shadow earlier ones.
    pub fn with(mut self, key: impl Into<String>, cell: impl Into<Cell>) -> Self {
        self.fields.push((key.into(), cell.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Cell> {
        self.fields
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, c)| c)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }
}

/// An in-memory list of records.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn with_record(mut self, record: Record) -> Self {
        self.push(record);
        self
    }
}

impl FromIterator<Record> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl DataSource for RecordSet {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn field_keys(&self) -> Vec<String> {
        // Keys of the first record, deduplicated in order.
        let mut keys = Vec::new();
        if let Some(first) = self.records.first() {
            for key in first.keys() {
                if !keys.iter().any(|k| k == key) {
                    keys.push(key.to_string());
                }
            }
        }
        keys
    }

    fn cell(&self, record: usize, key: &str) -> Option<Cell> {
        self.records.get(record)?.get(key).cloned()
    }
}

//! Append-only record of a session's successful questions.

use graphquery_core::QueryRecord;

/// Every record is kept for the life of the session; display asks for the
/// most recent few.
#[derive(Debug, Default)]
pub struct SessionHistory {
    records: Vec<QueryRecord>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: QueryRecord) {
        self.records.push(record);
    }

    /// Up to `n` records, most recent first.
    pub fn recent(&self, n: usize) -> Vec<&QueryRecord> {
        self.records.iter().rev().take(n).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &QueryRecord> {
        self.records.iter()
    }
}

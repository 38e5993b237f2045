use std::collections::BTreeMap;

use crate::{Record, RecordId, RecordStatus};

/// Complete known state of the record set at one point in time.
///
/// Keys are unique; iteration follows key order only so that output is
/// deterministic, callers must not read meaning into it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    records: BTreeMap<RecordId, Record>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from records; a later record with a repeated id
    /// replaces the earlier one.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut snapshot = Self::new();
        for record in records {
            snapshot.insert(record);
        }
        snapshot
    }

    pub fn insert(&mut self, record: Record) -> Option<Record> {
        self.records.insert(record.id.clone(), record)
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Folds another snapshot into this one; records from `other` win.
    pub fn merge(&mut self, other: Snapshot) {
        self.records.extend(other.records);
    }

    pub fn status_summary(&self) -> StatusSummary {
        let mut summary = StatusSummary {
            total: self.records.len(),
            ..StatusSummary::default()
        };
        for record in self.records.values() {
            match record.status {
                RecordStatus::Pending => summary.pending += 1,
                RecordStatus::InProgress => summary.in_progress += 1,
                RecordStatus::Resolved => summary.resolved += 1,
                RecordStatus::Closed => summary.closed += 1,
                RecordStatus::Other(_) => summary.other += 1,
            }
        }
        summary
    }
}

impl FromIterator<Record> for Snapshot {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self::from_records(iter)
    }
}

/// Per-status record counts for the metric cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusSummary {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub closed: usize,
    pub other: usize,
}

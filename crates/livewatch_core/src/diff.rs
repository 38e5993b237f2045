use std::collections::BTreeSet;

use crate::{Record, RecordId, RecordStatus, Snapshot};

/// A record whose status moved between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub record: Record,
    pub previous: RecordStatus,
}

/// What changed between an old and a new snapshot.
///
/// Removals are never reported; a record missing from the new snapshot simply
/// does not appear in any list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeSet {
    pub added: Vec<Record>,
    /// Records that entered the resolved state. A record first observed
    /// already resolved appears here and in `added`.
    pub resolved: Vec<Record>,
    pub status_changed: Vec<StatusChange>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.resolved.is_empty() && self.status_changed.is_empty()
    }

    pub fn added_ids(&self) -> Vec<RecordId> {
        self.added.iter().map(|r| r.id.clone()).collect()
    }

    pub fn resolved_ids(&self) -> Vec<RecordId> {
        self.resolved.iter().map(|r| r.id.clone()).collect()
    }

    pub fn status_changed_ids(&self) -> Vec<RecordId> {
        self.status_changed
            .iter()
            .map(|change| change.record.id.clone())
            .collect()
    }
}

/// Compares two snapshots. Pure: the result depends only on the arguments.
pub fn diff(old: &Snapshot, new: &Snapshot) -> ChangeSet {
    let resolved_before: BTreeSet<&RecordId> = old
        .records()
        .filter(|record| record.status.is_resolved())
        .map(|record| &record.id)
        .collect();

    let mut changes = ChangeSet::default();
    for record in new.records() {
        let previous = old.get(&record.id);
        if previous.is_none() {
            changes.added.push(record.clone());
        }

        let entered_resolved =
            record.status.is_resolved() && !resolved_before.contains(&record.id);
        if entered_resolved {
            changes.resolved.push(record.clone());
            continue;
        }

        if let Some(previous) = previous {
            if previous.status != record.status {
                changes.status_changed.push(StatusChange {
                    record: record.clone(),
                    previous: previous.status.clone(),
                });
            }
        }
    }
    changes
}

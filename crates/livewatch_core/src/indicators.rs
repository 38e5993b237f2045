use crate::{ChangeSet, Snapshot};

/// Coarse backlog level derived from the share of pending records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SystemLoad {
    #[default]
    Normal,
    Medium,
    High,
}

impl SystemLoad {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let summary = snapshot.status_summary();
        if summary.total == 0 {
            return Self::Normal;
        }
        let pending_ratio = summary.pending as f64 / summary.total as f64;
        if pending_ratio > 0.7 {
            Self::High
        } else if pending_ratio > 0.4 {
            Self::Medium
        } else {
            Self::Normal
        }
    }
}

/// Running dashboard counters. Tallies only ever grow.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Indicators {
    pub new_items_total: u64,
    pub resolved_total: u64,
    pub system_load: SystemLoad,
    pub cycles_completed: u64,
    pub cycles_failed: u64,
    pub last_update: Option<String>,
}

impl Indicators {
    pub(crate) fn record_success(&mut self, changes: &ChangeSet, current: &Snapshot) {
        self.cycles_completed += 1;
        self.new_items_total += changes.added.len() as u64;
        self.resolved_total += changes.resolved.len() as u64;
        self.system_load = SystemLoad::from_snapshot(current);
    }

    pub(crate) fn record_failure(&mut self) {
        self.cycles_failed += 1;
    }
}

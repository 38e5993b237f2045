use std::fmt;

use crate::ChangeSet;

/// Added-record count above which a `new-items` notification is important.
pub const DEFAULT_IMPORTANT_THRESHOLD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    NewItems,
    Resolved,
    StatusUpdate,
}

impl NotificationKind {
    /// Stable identifier consumed by presentation layers.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NewItems => "new-items",
            Self::Resolved => "resolved",
            Self::StatusUpdate => "status-update",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::NewItems => "New Items",
            Self::Resolved => "Items Resolved",
            Self::StatusUpdate => "Status Updates",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub count: usize,
    pub important: bool,
}

impl Notification {
    pub fn summary(&self) -> String {
        let noun = if self.count == 1 { "item" } else { "items" };
        match self.kind {
            NotificationKind::NewItems => format!("{} new {noun} received", self.count),
            NotificationKind::Resolved => format!("{} {noun} resolved", self.count),
            NotificationKind::StatusUpdate => format!("{} {noun} updated", self.count),
        }
    }
}

/// Turns a change set into notifications, one per non-empty category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationPolicy {
    pub important_threshold: usize,
}

impl Default for NotificationPolicy {
    fn default() -> Self {
        Self {
            important_threshold: DEFAULT_IMPORTANT_THRESHOLD,
        }
    }
}

impl NotificationPolicy {
    pub fn new(important_threshold: usize) -> Self {
        Self {
            important_threshold,
        }
    }

    pub fn notifications(&self, changes: &ChangeSet) -> Vec<Notification> {
        let mut out = Vec::with_capacity(3);
        if !changes.added.is_empty() {
            out.push(Notification {
                kind: NotificationKind::NewItems,
                count: changes.added.len(),
                important: changes.added.len() > self.important_threshold,
            });
        }
        if !changes.resolved.is_empty() {
            out.push(Notification {
                kind: NotificationKind::Resolved,
                count: changes.resolved.len(),
                important: false,
            });
        }
        if !changes.status_changed.is_empty() {
            out.push(Notification {
                kind: NotificationKind::StatusUpdate,
                count: changes.status_changed.len(),
                important: false,
            });
        }
        out
    }
}

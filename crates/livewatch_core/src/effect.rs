use std::sync::Arc;
use std::time::Duration;

use crate::{ChangeSet, CycleId, Notification, Snapshot, StatusTransition};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fire `Msg::TimerFired { generation }` after `after`.
    ArmTimer { generation: u64, after: Duration },
    CancelTimer { generation: u64 },
    /// Call the fetcher and report back with `Msg::CycleCompleted`.
    BeginFetch { cycle: CycleId },
    /// Publish the new current snapshot to readers.
    SnapshotReplaced(Arc<Snapshot>),
    /// Hand a non-empty change set to the notification dispatcher.
    Publish {
        cycle: CycleId,
        changes: ChangeSet,
        notifications: Vec<Notification>,
    },
    StatusChanged(StatusTransition),
    CycleFailed { cycle: CycleId, message: String },
    Shutdown,
}

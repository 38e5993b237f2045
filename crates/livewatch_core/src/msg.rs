use crate::{CycleId, Snapshot};

/// Why a cycle's fetch failed. The scheduler does not distinguish causes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleFailure {
    pub message: String,
}

impl CycleFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Begin polling.
    Start,
    /// An armed timer elapsed. Stale generations are ignored.
    TimerFired { generation: u64 },
    /// Operator paused live updates.
    Pause,
    /// Operator resumed live updates.
    Resume,
    /// Operator asked for an immediate refresh.
    ForceTick,
    /// Tear down; every later message is ignored.
    Stop,
    /// The dashboard was hidden (tab backgrounded).
    VisibilityLost,
    VisibilityRegained,
    NetworkLost,
    NetworkRegained,
    /// The fetch for `cycle` finished.
    CycleCompleted {
        cycle: CycleId,
        result: Result<Snapshot, CycleFailure>,
        /// Wall-clock label for the completion, supplied by the driver.
        finished_at: Option<String>,
    },
}

use std::time::Duration;

use crate::{ConnectionState, CycleId, Indicators, Lifecycle, StatusSummary};

/// Read-only picture of the scheduler for status panels and metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerView {
    pub lifecycle: Lifecycle,
    pub active: bool,
    pub connection: ConnectionState,
    pub interval: Duration,
    pub cycle_in_flight: Option<CycleId>,
    pub summary: StatusSummary,
    pub indicators: Indicators,
}

use std::sync::Arc;
use std::time::Duration;

use crate::view_model::SchedulerView;
use crate::{
    ConnectionEvent, ConnectionState, ConnectionStatusTracker, Effect, Indicators,
    NotificationPolicy, Snapshot,
};

pub type CycleId = u64;

/// Default time between the end of one cycle and the start of the next.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(30_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub interval: Duration,
    pub policy: NotificationPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            policy: NotificationPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOrigin {
    /// Started by the regular timer; re-arms the timer when it completes.
    Scheduled,
    /// Started by a manual refresh; leaves the regular timer alone.
    Forced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InFlight {
    pub cycle: CycleId,
    pub origin: CycleOrigin,
}

/// Everything the scheduler owns. Only [`crate::update`] mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchedulerState {
    config: SchedulerConfig,
    lifecycle: Lifecycle,
    active: bool,
    offline: bool,
    snapshot: Arc<Snapshot>,
    tracker: ConnectionStatusTracker,
    armed_timer: Option<u64>,
    next_generation: u64,
    next_cycle: CycleId,
    in_flight: Option<InFlight>,
    scheduled_pending: bool,
    forced_pending: bool,
    indicators: Indicators,
}

impl SchedulerState {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            next_cycle: 1,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.tracker.state()
    }

    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.snapshot
    }

    pub fn indicators(&self) -> &Indicators {
        &self.indicators
    }

    pub fn in_flight(&self) -> Option<InFlight> {
        self.in_flight
    }

    pub fn armed_timer(&self) -> Option<u64> {
        self.armed_timer
    }

    pub fn view(&self) -> SchedulerView {
        SchedulerView {
            lifecycle: self.lifecycle,
            active: self.active,
            connection: self.tracker.state(),
            interval: self.config.interval,
            cycle_in_flight: self.in_flight.map(|f| f.cycle),
            summary: self.snapshot.status_summary(),
            indicators: self.indicators.clone(),
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    pub(crate) fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        self.lifecycle = lifecycle;
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub(crate) fn is_offline(&self) -> bool {
        self.offline
    }

    pub(crate) fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub(crate) fn transition(&mut self, event: ConnectionEvent, effects: &mut Vec<Effect>) {
        if let Some(transition) = self.tracker.apply(event) {
            effects.push(Effect::StatusChanged(transition));
        }
    }

    pub(crate) fn arm_timer(&mut self, effects: &mut Vec<Effect>) {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.armed_timer = Some(generation);
        effects.push(Effect::ArmTimer {
            generation,
            after: self.config.interval,
        });
    }

    pub(crate) fn cancel_timer(&mut self, effects: &mut Vec<Effect>) {
        if let Some(generation) = self.armed_timer.take() {
            effects.push(Effect::CancelTimer { generation });
        }
    }

    /// Consumes the armed timer if `generation` matches it.
    pub(crate) fn take_timer(&mut self, generation: u64) -> bool {
        if self.armed_timer == Some(generation) {
            self.armed_timer = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn begin_cycle(&mut self, origin: CycleOrigin, effects: &mut Vec<Effect>) {
        let cycle = self.next_cycle;
        self.next_cycle += 1;
        self.in_flight = Some(InFlight { cycle, origin });
        self.transition(ConnectionEvent::CycleStarted, effects);
        effects.push(Effect::BeginFetch { cycle });
    }

    /// Clears the in-flight marker if it belongs to `cycle`.
    pub(crate) fn finish_cycle(&mut self, cycle: CycleId) -> Option<InFlight> {
        match self.in_flight {
            Some(in_flight) if in_flight.cycle == cycle => self.in_flight.take(),
            _ => None,
        }
    }

    pub(crate) fn queue_scheduled(&mut self) {
        self.scheduled_pending = true;
    }

    pub(crate) fn queue_forced(&mut self) {
        self.forced_pending = true;
    }

    pub(crate) fn take_queued(&mut self) -> Option<CycleOrigin> {
        if std::mem::take(&mut self.scheduled_pending) {
            Some(CycleOrigin::Scheduled)
        } else if std::mem::take(&mut self.forced_pending) {
            Some(CycleOrigin::Forced)
        } else {
            None
        }
    }

    pub(crate) fn clear_queued(&mut self) {
        self.scheduled_pending = false;
        self.forced_pending = false;
    }

    pub(crate) fn replace_snapshot(&mut self, snapshot: Arc<Snapshot>) {
        self.snapshot = snapshot;
    }

    pub(crate) fn release(&mut self) {
        self.snapshot = Arc::new(Snapshot::new());
        self.in_flight = None;
        self.clear_queued();
    }

    pub(crate) fn indicators_mut(&mut self) -> &mut Indicators {
        &mut self.indicators
    }
}

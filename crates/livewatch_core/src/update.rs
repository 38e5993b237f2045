use std::sync::Arc;

use crate::state::CycleOrigin;
use crate::{
    diff, ConnectionEvent, CycleFailure, CycleId, Effect, Lifecycle, Msg, SchedulerState, Snapshot,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// Cycles never overlap: a new cycle starts only from a timer or a manual
/// refresh when nothing is in flight, otherwise the request is queued and
/// started from the completion of the running cycle.
pub fn update(mut state: SchedulerState, msg: Msg) -> (SchedulerState, Vec<Effect>) {
    let mut effects = Vec::new();
    if state.lifecycle() == Lifecycle::Stopped {
        return (state, effects);
    }

    match msg {
        Msg::Start => {
            if state.lifecycle() == Lifecycle::Idle {
                state.set_lifecycle(Lifecycle::Running);
                state.set_active(true);
                state.transition(ConnectionEvent::Connected, &mut effects);
                state.arm_timer(&mut effects);
            }
        }
        Msg::TimerFired { generation } => {
            if state.is_running() && state.take_timer(generation) && state.is_active() {
                if state.in_flight().is_some() {
                    state.queue_scheduled();
                } else {
                    state.begin_cycle(CycleOrigin::Scheduled, &mut effects);
                }
            }
        }
        Msg::Pause => deactivate(&mut state, ConnectionEvent::Paused, &mut effects),
        Msg::VisibilityLost => deactivate(&mut state, ConnectionEvent::VisibilityLost, &mut effects),
        Msg::NetworkLost => {
            if state.is_running() {
                state.set_offline(true);
            }
            deactivate(&mut state, ConnectionEvent::NetworkLost, &mut effects);
        }
        Msg::Resume => activate(&mut state, ConnectionEvent::Resumed, &mut effects),
        Msg::VisibilityRegained => {
            activate(&mut state, ConnectionEvent::VisibilityRegained, &mut effects)
        }
        Msg::NetworkRegained => {
            state.set_offline(false);
            activate(&mut state, ConnectionEvent::NetworkRegained, &mut effects);
        }
        Msg::ForceTick => {
            if state.is_running() {
                if !state.is_active() {
                    activate(&mut state, ConnectionEvent::Resumed, &mut effects);
                }
                // Still inactive means offline: a manual refresh cannot override that.
                if state.is_active() {
                    if state.in_flight().is_some() {
                        state.queue_forced();
                    } else {
                        state.begin_cycle(CycleOrigin::Forced, &mut effects);
                    }
                }
            }
        }
        Msg::CycleCompleted {
            cycle,
            result,
            finished_at,
        } => complete_cycle(&mut state, cycle, result, finished_at, &mut effects),
        Msg::Stop => {
            state.cancel_timer(&mut effects);
            state.set_active(false);
            state.set_lifecycle(Lifecycle::Stopped);
            state.release();
            effects.push(Effect::Shutdown);
        }
    }

    (state, effects)
}

fn deactivate(state: &mut SchedulerState, event: ConnectionEvent, effects: &mut Vec<Effect>) {
    if !state.is_running() {
        return;
    }
    state.set_active(false);
    state.clear_queued();
    state.cancel_timer(effects);
    state.transition(event, effects);
}

fn activate(state: &mut SchedulerState, event: ConnectionEvent, effects: &mut Vec<Effect>) {
    if !state.is_running() || state.is_offline() || state.is_active() {
        return;
    }
    state.set_active(true);
    state.transition(event, effects);

    // A scheduled cycle still in flight re-arms the timer itself on completion.
    let scheduled_in_flight = state
        .in_flight()
        .is_some_and(|f| f.origin == CycleOrigin::Scheduled);
    if state.armed_timer().is_none() && !scheduled_in_flight {
        state.arm_timer(effects);
    }
}

fn complete_cycle(
    state: &mut SchedulerState,
    cycle: CycleId,
    result: Result<Snapshot, CycleFailure>,
    finished_at: Option<String>,
    effects: &mut Vec<Effect>,
) {
    let Some(in_flight) = state.finish_cycle(cycle) else {
        return;
    };

    match result {
        Ok(snapshot) => {
            let changes = diff(state.snapshot(), &snapshot);
            if !changes.is_empty() {
                let snapshot = Arc::new(snapshot);
                state.replace_snapshot(snapshot.clone());
                effects.push(Effect::SnapshotReplaced(snapshot));
            }
            let current = state.snapshot().clone();
            let indicators = state.indicators_mut();
            indicators.record_success(&changes, &current);
            if finished_at.is_some() {
                indicators.last_update = finished_at;
            }
            if !changes.is_empty() {
                let notifications = state.config().policy.notifications(&changes);
                effects.push(Effect::Publish {
                    cycle,
                    changes,
                    notifications,
                });
            }
            state.transition(ConnectionEvent::CycleSucceeded, effects);
        }
        Err(failure) => {
            state.indicators_mut().record_failure();
            effects.push(Effect::CycleFailed {
                cycle,
                message: failure.message,
            });
            state.transition(ConnectionEvent::CycleFailed, effects);
        }
    }

    if !state.is_active() {
        return;
    }
    if in_flight.origin == CycleOrigin::Scheduled && state.armed_timer().is_none() {
        state.arm_timer(effects);
    }
    if let Some(origin) = state.take_queued() {
        state.begin_cycle(origin, effects);
    }
}

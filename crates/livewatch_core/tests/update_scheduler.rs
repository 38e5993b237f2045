use std::sync::Once;
use std::time::Duration;

use livewatch_core::{
    update, ConnectionState, CycleFailure, CycleId, Effect, Lifecycle, Msg, NotificationKind,
    Record, RecordStatus, SchedulerConfig, SchedulerState, Snapshot, StatusTransition,
    DEFAULT_POLL_INTERVAL,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn started() -> (SchedulerState, u64) {
    let (state, effects) = update(SchedulerState::new(SchedulerConfig::default()), Msg::Start);
    let generation = armed_generation(&effects).expect("start arms a timer");
    (state, generation)
}

fn armed_generation(effects: &[Effect]) -> Option<u64> {
    effects.iter().find_map(|effect| match effect {
        Effect::ArmTimer { generation, .. } => Some(*generation),
        _ => None,
    })
}

fn fetched_cycle(effects: &[Effect]) -> Option<CycleId> {
    effects.iter().find_map(|effect| match effect {
        Effect::BeginFetch { cycle } => Some(*cycle),
        _ => None,
    })
}

fn complete(
    state: SchedulerState,
    cycle: CycleId,
    snapshot: Snapshot,
) -> (SchedulerState, Vec<Effect>) {
    update(
        state,
        Msg::CycleCompleted {
            cycle,
            result: Ok(snapshot),
            finished_at: Some("2026-01-01T00:00:00Z".to_string()),
        },
    )
}

fn fail(state: SchedulerState, cycle: CycleId) -> (SchedulerState, Vec<Effect>) {
    update(
        state,
        Msg::CycleCompleted {
            cycle,
            result: Err(CycleFailure::new("connection refused")),
            finished_at: None,
        },
    )
}

fn two_records() -> Snapshot {
    [
        Record::new("1", RecordStatus::Pending),
        Record::new("2", RecordStatus::Resolved),
    ]
    .into_iter()
    .collect()
}

fn transition(from: ConnectionState, to: ConnectionState) -> Effect {
    Effect::StatusChanged(StatusTransition { from, to })
}

#[test]
fn start_goes_live_and_arms_first_tick() {
    init_logging();
    let (state, effects) = update(SchedulerState::new(SchedulerConfig::default()), Msg::Start);

    assert_eq!(
        effects,
        vec![
            transition(ConnectionState::Connecting, ConnectionState::Live),
            Effect::ArmTimer {
                generation: 1,
                after: DEFAULT_POLL_INTERVAL,
            },
        ]
    );
    assert_eq!(state.lifecycle(), Lifecycle::Running);

    let (state, effects) = update(state, Msg::Start);
    assert!(effects.is_empty());
    assert_eq!(state.armed_timer(), Some(1));
}

#[test]
fn configured_interval_is_used_for_every_timer() {
    let config = SchedulerConfig {
        interval: Duration::from_millis(250),
        ..SchedulerConfig::default()
    };
    let (_, effects) = update(SchedulerState::new(config), Msg::Start);
    assert!(effects.contains(&Effect::ArmTimer {
        generation: 1,
        after: Duration::from_millis(250),
    }));
}

#[test]
fn successful_cycle_replaces_snapshot_before_publishing() {
    init_logging();
    let (state, generation) = started();
    let (state, effects) = update(state, Msg::TimerFired { generation });
    assert_eq!(
        effects,
        vec![
            transition(ConnectionState::Live, ConnectionState::Updating),
            Effect::BeginFetch { cycle: 1 },
        ]
    );

    let (state, effects) = complete(state, 1, two_records());
    assert_eq!(effects.len(), 4);
    match &effects[0] {
        Effect::SnapshotReplaced(snapshot) => assert_eq!(snapshot.len(), 2),
        other => panic!("expected snapshot replacement first, got {other:?}"),
    }
    match &effects[1] {
        Effect::Publish {
            cycle,
            changes,
            notifications,
        } => {
            assert_eq!(*cycle, 1);
            assert_eq!(changes.added.len(), 2);
            let kinds: Vec<_> = notifications.iter().map(|n| n.kind).collect();
            assert_eq!(kinds, vec![NotificationKind::NewItems, NotificationKind::Resolved]);
        }
        other => panic!("expected publish second, got {other:?}"),
    }
    assert_eq!(
        effects[2],
        transition(ConnectionState::Updating, ConnectionState::Live)
    );
    assert_eq!(armed_generation(&effects[3..]), Some(2));

    assert_eq!(state.snapshot().len(), 2);
    assert_eq!(state.indicators().new_items_total, 2);
    assert_eq!(state.indicators().resolved_total, 1);
    assert_eq!(
        state.indicators().last_update.as_deref(),
        Some("2026-01-01T00:00:00Z")
    );
}

#[test]
fn unchanged_cycle_publishes_nothing_but_rearms() {
    let (state, generation) = started();
    let (state, _) = update(state, Msg::TimerFired { generation });
    let (state, effects) = complete(state, 1, Snapshot::new());

    assert_eq!(
        effects,
        vec![
            transition(ConnectionState::Updating, ConnectionState::Live),
            Effect::ArmTimer {
                generation: 2,
                after: DEFAULT_POLL_INTERVAL,
            },
        ]
    );
    assert_eq!(state.indicators().cycles_completed, 1);
}

#[test]
fn failed_cycle_keeps_snapshot_and_retries_on_same_cadence() {
    init_logging();
    let (state, generation) = started();
    let (state, _) = update(state, Msg::TimerFired { generation });
    let (state, _) = complete(state, 1, two_records());
    let generation = state.armed_timer().unwrap();

    let (state, _) = update(state, Msg::TimerFired { generation });
    let (state, effects) = fail(state, 2);

    assert_eq!(
        effects,
        vec![
            Effect::CycleFailed {
                cycle: 2,
                message: "connection refused".to_string(),
            },
            transition(ConnectionState::Updating, ConnectionState::Error),
            Effect::ArmTimer {
                generation: generation + 1,
                after: DEFAULT_POLL_INTERVAL,
            },
        ]
    );
    assert_eq!(state.connection_state(), ConnectionState::Error);
    assert_eq!(state.snapshot().len(), 2);
    assert_eq!(state.indicators().cycles_failed, 1);

    let (state, _) = update(state, Msg::TimerFired { generation: generation + 1 });
    assert_eq!(state.connection_state(), ConnectionState::Updating);
}

#[test]
fn paused_scheduler_runs_no_cycles_and_resume_arms_one_timer() {
    let (state, generation) = started();
    let (state, effects) = update(state, Msg::Pause);
    assert_eq!(
        effects,
        vec![
            Effect::CancelTimer { generation },
            transition(ConnectionState::Live, ConnectionState::Paused),
        ]
    );

    let (state, effects) = update(state, Msg::Pause);
    assert!(effects.is_empty());

    let mut state = state;
    for _ in 0..5 {
        let (next, effects) = update(state, Msg::TimerFired { generation });
        assert!(effects.is_empty());
        state = next;
    }

    let (state, effects) = update(state, Msg::Resume);
    assert_eq!(
        effects,
        vec![
            transition(ConnectionState::Paused, ConnectionState::Live),
            Effect::ArmTimer {
                generation: generation + 1,
                after: DEFAULT_POLL_INTERVAL,
            },
        ]
    );

    let (_, effects) = update(state, Msg::Resume);
    assert!(effects.is_empty());
}

#[test]
fn force_tick_while_cycle_runs_is_queued_until_completion() {
    let (state, generation) = started();
    let (state, _) = update(state, Msg::TimerFired { generation });

    let (state, effects) = update(state, Msg::ForceTick);
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::ForceTick);
    assert!(effects.is_empty());

    let (state, effects) = complete(state, 1, Snapshot::new());
    let rearmed = armed_generation(&effects).expect("scheduled cycle re-arms");
    assert_eq!(fetched_cycle(&effects), Some(2));
    assert_eq!(state.connection_state(), ConnectionState::Updating);

    // The forced cycle finishes without touching the regular timer.
    let (state, effects) = complete(state, 2, Snapshot::new());
    assert_eq!(armed_generation(&effects), None);
    assert_eq!(fetched_cycle(&effects), None);
    assert_eq!(state.armed_timer(), Some(rearmed));
}

#[test]
fn force_tick_runs_immediately_without_moving_the_timer() {
    let (state, generation) = started();
    let (state, effects) = update(state, Msg::ForceTick);
    assert_eq!(fetched_cycle(&effects), Some(1));
    assert!(armed_generation(&effects).is_none());
    assert_eq!(state.armed_timer(), Some(generation));
}

#[test]
fn timer_during_forced_cycle_runs_after_it() {
    let (state, generation) = started();
    let (state, _) = update(state, Msg::ForceTick);
    let (state, effects) = update(state, Msg::TimerFired { generation });
    assert!(effects.is_empty());

    let (state, effects) = complete(state, 1, Snapshot::new());
    assert_eq!(fetched_cycle(&effects), Some(2));
    assert_eq!(state.armed_timer(), None);

    let (state, effects) = complete(state, 2, Snapshot::new());
    assert!(armed_generation(&effects).is_some());
    assert!(state.in_flight().is_none());
}

#[test]
fn force_tick_while_paused_resumes_first() {
    let (state, _) = started();
    let (state, _) = update(state, Msg::Pause);
    let (state, effects) = update(state, Msg::ForceTick);

    assert_eq!(
        effects[0],
        transition(ConnectionState::Paused, ConnectionState::Live)
    );
    assert!(armed_generation(&effects).is_some());
    assert_eq!(fetched_cycle(&effects), Some(1));
    assert!(state.is_active());
}

#[test]
fn pause_during_cycle_applies_result_without_rearming() {
    let (state, generation) = started();
    let (state, _) = update(state, Msg::TimerFired { generation });
    let (state, _) = update(state, Msg::Pause);

    let (state, effects) = complete(state, 1, two_records());
    assert!(armed_generation(&effects).is_none());
    assert_eq!(state.connection_state(), ConnectionState::Paused);
    assert_eq!(state.snapshot().len(), 2);
}

#[test]
fn network_loss_wins_until_network_returns() {
    let (state, generation) = started();
    let (state, effects) = update(state, Msg::NetworkLost);
    assert_eq!(
        effects,
        vec![
            Effect::CancelTimer { generation },
            transition(ConnectionState::Live, ConnectionState::Offline),
        ]
    );

    let (state, effects) = update(state, Msg::Resume);
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::VisibilityRegained);
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::ForceTick);
    assert!(effects.is_empty());
    assert_eq!(state.connection_state(), ConnectionState::Offline);

    let (state, effects) = update(state, Msg::NetworkRegained);
    assert_eq!(
        effects[0],
        transition(ConnectionState::Offline, ConnectionState::Live)
    );
    assert!(armed_generation(&effects).is_some());
    assert!(state.is_active());
}

#[test]
fn hidden_tab_pauses_and_visible_tab_resumes() {
    let (state, _) = started();
    let (state, _) = update(state, Msg::VisibilityLost);
    assert_eq!(state.connection_state(), ConnectionState::Paused);
    let (state, _) = update(state, Msg::NetworkLost);
    assert_eq!(state.connection_state(), ConnectionState::Offline);
    let (state, _) = update(state, Msg::NetworkRegained);
    assert_eq!(state.connection_state(), ConnectionState::Live);
    let (state, _) = update(state, Msg::VisibilityLost);
    let (state, _) = update(state, Msg::VisibilityRegained);
    assert_eq!(state.connection_state(), ConnectionState::Live);
}

#[test]
fn stop_cancels_and_ignores_everything_after() {
    let (state, generation) = started();
    let (state, _) = update(state, Msg::TimerFired { generation });
    let (state, _) = complete(state, 1, two_records());
    let generation = state.armed_timer().unwrap();
    let (state, _) = update(state, Msg::ForceTick);

    let (state, effects) = update(state, Msg::Stop);
    assert_eq!(
        effects,
        vec![Effect::CancelTimer { generation }, Effect::Shutdown]
    );
    assert_eq!(state.lifecycle(), Lifecycle::Stopped);
    assert!(state.snapshot().is_empty());

    for msg in [
        Msg::TimerFired { generation },
        Msg::Resume,
        Msg::Pause,
        Msg::ForceTick,
        Msg::Start,
        Msg::Stop,
    ] {
        let (_, effects) = update(state.clone(), msg);
        assert!(effects.is_empty());
    }
    let (_, effects) = complete(state, 2, two_records());
    assert!(effects.is_empty());
}

#[test]
fn stale_completion_is_ignored() {
    let (state, generation) = started();
    let (state, _) = update(state, Msg::TimerFired { generation });
    let before = state.clone();
    let (state, effects) = complete(state, 42, two_records());
    assert!(effects.is_empty());
    assert_eq!(state, before);
}

#[test]
fn lifecycle_calls_before_start_are_noops() {
    let state = SchedulerState::new(SchedulerConfig::default());
    for msg in [Msg::Pause, Msg::Resume, Msg::ForceTick, Msg::TimerFired { generation: 1 }] {
        let (next, effects) = update(state.clone(), msg);
        assert!(effects.is_empty());
        assert_eq!(next, state);
    }
}

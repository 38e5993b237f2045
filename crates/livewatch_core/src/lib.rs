//! Livewatch core: pure change detection and the polling state machine.
mod diff;
mod effect;
mod indicators;
mod msg;
mod notify;
mod record;
mod snapshot;
mod state;
mod status;
mod update;
mod view_model;

pub use diff::{diff, ChangeSet, StatusChange};
pub use effect::Effect;
pub use indicators::{Indicators, SystemLoad};
pub use msg::{CycleFailure, Msg};
pub use notify::{Notification, NotificationKind, NotificationPolicy, DEFAULT_IMPORTANT_THRESHOLD};
pub use record::{Payload, Record, RecordId, RecordStatus};
pub use snapshot::{Snapshot, StatusSummary};
pub use state::{
    CycleId, CycleOrigin, InFlight, Lifecycle, SchedulerConfig, SchedulerState,
    DEFAULT_POLL_INTERVAL,
};
pub use status::{ConnectionEvent, ConnectionState, ConnectionStatusTracker, StatusTransition};
pub use update::update;
pub use view_model::SchedulerView;

//! Livewatch engine: record fetching, notification dispatch and the driver
//! that runs the core scheduler against real timers.
mod config;
mod decode;
mod dispatch;
mod engine;
mod fetch;
mod types;

pub use config::{Clock, ConfigError, WatchConfig};
pub use decode::decode_records;
pub use dispatch::{ChannelSink, DispatchError, LogSink, NotificationDispatcher, NotificationSink};
pub use engine::{EngineError, EngineHandle, LifecycleSignal};
pub use fetch::{FetchSettings, HttpFetcher, MergedFetcher, SnapshotFetcher};
pub use types::{EngineEvent, FailureKind, FetchError};

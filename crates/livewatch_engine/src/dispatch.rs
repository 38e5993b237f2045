use std::sync::{mpsc, Arc};

use engine_logging::{engine_info, engine_warn};
use livewatch_core::{CycleId, Notification};
use thiserror::Error;

use crate::EngineEvent;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("consumer disconnected")]
    Disconnected,
    #[error("consumer rejected notification: {0}")]
    Rejected(String),
}

/// A downstream consumer of notifications (UI, log, webhook...).
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &str;
    fn deliver(&self, cycle: CycleId, notification: &Notification) -> Result<(), DispatchError>;
}

/// Forwards notifications into the engine's event channel.
pub struct ChannelSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl NotificationSink for ChannelSink {
    fn name(&self) -> &str {
        "channel"
    }

    fn deliver(&self, cycle: CycleId, notification: &Notification) -> Result<(), DispatchError> {
        self.tx
            .send(EngineEvent::Notification {
                cycle,
                notification: *notification,
            })
            .map_err(|_| DispatchError::Disconnected)
    }
}

/// Writes each notification to the log.
#[derive(Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    fn deliver(&self, _cycle: CycleId, notification: &Notification) -> Result<(), DispatchError> {
        let marker = if notification.important { "!" } else { "" };
        engine_info!(
            "{}{}: {}",
            marker,
            notification.kind.title(),
            notification.summary()
        );
        Ok(())
    }
}

/// Fans notifications out to every sink. Best effort: a failing sink is
/// logged and skipped, never retried.
#[derive(Clone, Default)]
pub struct NotificationDispatcher {
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl NotificationDispatcher {
    pub fn new(sinks: Vec<Arc<dyn NotificationSink>>) -> Self {
        Self { sinks }
    }

    /// Returns the number of failed deliveries.
    pub fn dispatch(&self, cycle: CycleId, notifications: &[Notification]) -> usize {
        let mut failures = 0;
        for notification in notifications {
            for sink in &self.sinks {
                if let Err(err) = sink.deliver(cycle, notification) {
                    failures += 1;
                    engine_warn!(
                        "sink {} dropped {} notification: {}",
                        sink.name(),
                        notification.kind,
                        err
                    );
                }
            }
        }
        failures
    }
}

//! Terminal adapter: turns typed lines into engine commands and renders
//! engine events as text.

use livewatch_core::{ConnectionState, SchedulerView};
use livewatch_engine::{EngineEvent, LifecycleSignal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Pause,
    Resume,
    Toggle,
    Refresh,
    Signal(LifecycleSignal),
    Status,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let command = match line.trim().to_ascii_lowercase().as_str() {
            "p" | "pause" => Self::Pause,
            "r" | "resume" => Self::Resume,
            "t" | "toggle" => Self::Toggle,
            "f" | "refresh" => Self::Refresh,
            "hidden" => Self::Signal(LifecycleSignal::VisibilityLost),
            "visible" => Self::Signal(LifecycleSignal::VisibilityRegained),
            "offline" => Self::Signal(LifecycleSignal::NetworkLost),
            "online" => Self::Signal(LifecycleSignal::NetworkRegained),
            "s" | "status" => Self::Status,
            "h" | "help" | "?" => Self::Help,
            "q" | "quit" | "exit" => Self::Quit,
            _ => return None,
        };
        Some(command)
    }
}

pub const HELP: &str = "commands: pause | resume | toggle | refresh | hidden | visible | offline | online | status | quit";

pub fn render_event(event: &EngineEvent) -> Option<String> {
    match event {
        EngineEvent::StatusChanged(transition) => Some(format!("[{}]", transition.to)),
        EngineEvent::Notification { notification, .. } => {
            let marker = if notification.important { "(!) " } else { "" };
            Some(format!(
                "{marker}{}: {}",
                notification.kind.title(),
                notification.summary()
            ))
        }
        EngineEvent::CycleFailed { message, .. } => Some(format!("update failed: {message}")),
        EngineEvent::Stopped => None,
    }
}

pub fn render_status(view: &SchedulerView) -> String {
    let indicators = &view.indicators;
    let summary = &view.summary;
    format!(
        "state: {} | every {}s | records: {} (pending {}, in progress {}, resolved {}, closed {}) | \
         new: {} resolved: {} load: {:?} | cycles ok/failed: {}/{} | last update: {}",
        view.connection,
        view.interval.as_secs(),
        summary.total,
        summary.pending,
        summary.in_progress,
        summary.resolved,
        summary.closed,
        indicators.new_items_total,
        indicators.resolved_total,
        indicators.system_load,
        indicators.cycles_completed,
        indicators.cycles_failed,
        indicators.last_update.as_deref().unwrap_or("never"),
    )
}

/// Whether `toggle` should pause (otherwise it resumes).
pub fn toggle_pauses(state: ConnectionState) -> bool {
    !matches!(state, ConnectionState::Paused | ConnectionState::Offline)
}

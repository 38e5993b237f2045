use std::fmt;

/// Externally visible health of the polling engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Live,
    Updating,
    Paused,
    Error,
    Offline,
}

impl ConnectionState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Connecting => "Connecting...",
            Self::Live => "Live",
            Self::Updating => "Updating...",
            Self::Paused => "Paused",
            Self::Error => "Error",
            Self::Offline => "Offline",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inputs to the connection state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// Polling was started.
    Connected,
    CycleStarted,
    CycleSucceeded,
    CycleFailed,
    Paused,
    VisibilityLost,
    NetworkLost,
    Resumed,
    VisibilityRegained,
    NetworkRegained,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    pub from: ConnectionState,
    pub to: ConnectionState,
}

/// Holds exactly one [`ConnectionState`]; [`ConnectionStatusTracker::apply`] is
/// the only way to change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectionStatusTracker {
    state: ConnectionState,
}

impl ConnectionStatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Applies an event. Returns the transition when the state changed, or
    /// `None` when the event has no effect in the current state.
    pub fn apply(&mut self, event: ConnectionEvent) -> Option<StatusTransition> {
        let next = next_state(self.state, event)?;
        if next == self.state {
            return None;
        }
        let transition = StatusTransition {
            from: self.state,
            to: next,
        };
        self.state = next;
        Some(transition)
    }
}

fn next_state(current: ConnectionState, event: ConnectionEvent) -> Option<ConnectionState> {
    use ConnectionEvent as E;
    use ConnectionState as S;

    match (current, event) {
        (S::Connecting, E::Connected) => Some(S::Live),
        (S::Connecting | S::Live | S::Error, E::CycleStarted) => Some(S::Updating),
        (S::Updating, E::CycleSucceeded) => Some(S::Live),
        (S::Updating, E::CycleFailed) => Some(S::Error),
        // Network loss wins over any pause reason, including an existing pause.
        (S::Connecting | S::Live | S::Updating | S::Error | S::Paused, E::NetworkLost) => {
            Some(S::Offline)
        }
        (S::Connecting | S::Live | S::Updating | S::Error, E::Paused | E::VisibilityLost) => {
            Some(S::Paused)
        }
        (S::Paused, E::Resumed | E::VisibilityRegained) => Some(S::Live),
        (S::Offline, E::NetworkRegained) => Some(S::Live),
        _ => None,
    }
}

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use livewatch_core::{
    NotificationPolicy, SchedulerConfig, DEFAULT_IMPORTANT_THRESHOLD, DEFAULT_POLL_INTERVAL,
};
use thiserror::Error;

/// Produces the wall-clock label stored as "last update".
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("poll interval must be greater than zero")]
    ZeroInterval,
}

/// Tunables for the polling engine.
#[derive(Clone)]
pub struct WatchConfig {
    pub poll_interval: Duration,
    pub important_threshold: usize,
    /// Stamps successful cycles; `None` leaves "last update" unset.
    pub clock: Option<Clock>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            important_threshold: DEFAULT_IMPORTANT_THRESHOLD,
            clock: None,
        }
    }
}

impl fmt::Debug for WatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchConfig")
            .field("poll_interval", &self.poll_interval)
            .field("important_threshold", &self.important_threshold)
            .field("clock", &self.clock.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl WatchConfig {
    pub fn with_interval(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            interval: self.poll_interval,
            policy: NotificationPolicy::new(self.important_threshold),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_poll_every_thirty_seconds() {
        let config = WatchConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(30_000));
        assert_eq!(config.important_threshold, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = WatchConfig::with_interval(Duration::ZERO);
        assert_eq!(config.validate(), Err(ConfigError::ZeroInterval));
    }
}

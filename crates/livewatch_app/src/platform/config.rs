use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use chrono::Utc;
use engine_logging::engine_info;
use livewatch_core::{DEFAULT_IMPORTANT_THRESHOLD, DEFAULT_POLL_INTERVAL};
use livewatch_engine::{FetchSettings, WatchConfig};
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;

/// Looked up in the working directory when no `--config` is given.
const DEFAULT_CONFIG_FILENAME: &str = "livewatch.ron";

/// On-disk settings for the binary. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Record list endpoints; several are fetched together and merged.
    pub sources: Vec<String>,
    pub poll_interval_ms: u64,
    pub important_threshold: usize,
    pub request_timeout_ms: u64,
    pub log: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            important_threshold: DEFAULT_IMPORTANT_THRESHOLD,
            request_timeout_ms: FetchSettings::default().request_timeout.as_millis() as u64,
            log: LogDestination::default(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, or from `./livewatch.ron` if present, or defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILENAME);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        let config: AppConfig = ron::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;
        engine_info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sources.is_empty() {
            bail!("no record source configured; pass --url or set `sources` in the config file");
        }
        if self.poll_interval_ms == 0 {
            bail!("poll interval must be greater than zero");
        }
        Ok(())
    }

    pub fn watch_config(&self) -> WatchConfig {
        WatchConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            important_threshold: self.important_threshold,
            clock: Some(Arc::new(|| Utc::now().to_rfc3339())),
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            ..FetchSettings::default()
        }
    }
}

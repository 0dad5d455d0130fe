use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use quizzora_engine::{EngineSettings, DEFAULT_BACKEND_URL};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;

const DEFAULT_SETTINGS_FILE: &str = "quizzora.ron";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Contents of `quizzora.ron`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub backend_url: String,
    pub output_dir: PathBuf,
    pub log: LogDestination,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub upload_timeout_secs: u64,
    pub quiz_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub progress_tick_ms: u64,
    pub finalize_delay_ms: u64,
    pub max_status_polls: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        let engine = EngineSettings::default();
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            output_dir: PathBuf::from("."),
            log: LogDestination::default(),
            connect_timeout_secs: engine.connect_timeout.as_secs(),
            request_timeout_secs: engine.request_timeout.as_secs(),
            upload_timeout_secs: engine.upload_timeout.as_secs(),
            quiz_timeout_secs: engine.quiz_timeout.as_secs(),
            poll_interval_ms: millis(engine.poll_interval),
            progress_tick_ms: millis(engine.progress_tick),
            finalize_delay_ms: millis(engine.finalize_delay),
            max_status_polls: engine.max_status_polls,
        }
    }
}

impl AppSettings {
    /// Loads settings from `explicit`, or from `./quizzora.ron` when no path
    /// is given and that file exists. Missing default file means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let path = Path::new(DEFAULT_SETTINGS_FILE);
                if path.exists() {
                    Self::load_from(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = ron::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        engine_info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        let max_status_polls = if self.max_status_polls == 0 {
            engine_warn!("max_status_polls of 0 would never poll; using the default");
            EngineSettings::default().max_status_polls
        } else {
            self.max_status_polls
        };
        EngineSettings {
            backend_url: self.backend_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            upload_timeout: Duration::from_secs(self.upload_timeout_secs),
            quiz_timeout: Duration::from_secs(self.quiz_timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            progress_tick: Duration::from_millis(self.progress_tick_ms.max(1)),
            finalize_delay: Duration::from_millis(self.finalize_delay_ms),
            max_status_polls,
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

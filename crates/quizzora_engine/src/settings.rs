use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub backend_url: String,
    pub connect_timeout: Duration,
    /// Applies to every round trip except file uploads and quiz generation.
    pub request_timeout: Duration,
    /// Applies to file uploads.
    pub upload_timeout: Duration,
    /// Applies to quiz generation, which waits on the model.
    pub quiz_timeout: Duration,
    pub poll_interval: Duration,
    pub progress_tick: Duration,
    /// How long 100% stays visible before the summary is published.
    pub finalize_delay: Duration,
    /// Status polls per attempt before giving up.
    pub max_status_polls: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            upload_timeout: Duration::from_secs(300),
            quiz_timeout: Duration::from_secs(300),
            poll_interval: Duration::from_secs(2),
            progress_tick: Duration::from_secs(1),
            finalize_delay: Duration::from_secs(1),
            max_status_polls: 1800,
        }
    }
}

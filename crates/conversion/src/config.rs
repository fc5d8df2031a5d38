//! Configuration loading from environment variables

use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Conversion backend settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service root; `/upload` and `/download/{id}` are appended
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    /// Read `CONVERTER_BASE_URL` and `CONVERTER_TIMEOUT_SECS`, falling back
    /// to the defaults for missing or unparsable values
    pub fn from_env() -> Self {
        let base_url = env::var("CONVERTER_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout = env::var("CONVERTER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self {
            base_url,
            timeout: Duration::from_secs(timeout),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Where downloaded artifacts are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadConfig {
    pub directory: PathBuf,
}

impl DownloadConfig {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// `DOWNLOAD_DIR`, or the current directory
    pub fn from_env() -> Self {
        let directory = env::var("DOWNLOAD_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .or_else(|| env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        Self { directory }
    }
}

//! Layered runtime settings.
//!
//! Defaults, then an optional TOML file, then `STILLWATER_DOCTOR_*`
//! environment variables. Command-line flags override on top of this in
//! `main`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

/// Runtime settings for the doctor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the admin server.
    pub base_url: String,
    /// Refresh cadence in seconds.
    pub poll_interval_secs: u64,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Persistent diagram cache file. Defaults to the platform cache dir.
    pub cache_file: Option<PathBuf>,
    /// File recording the last-active tab. Defaults to the platform state
    /// dir.
    pub state_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            poll_interval_secs: 5,
            request_timeout_secs: 10,
            cache_file: None,
            state_file: None,
        }
    }
}

impl Settings {
    /// Load settings, layering an optional file and the environment over
    /// the defaults.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path.to_path_buf()));
        }
        builder = builder.add_source(Environment::with_prefix("STILLWATER_DOCTOR"));
        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Resolved diagram cache path.
    pub fn cache_file(&self) -> PathBuf {
        self.cache_file.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("stillwater-doctor")
                .join("diagrams.json")
        })
    }

    /// Resolved last-active-tab path.
    pub fn state_file(&self) -> PathBuf {
        self.state_file.clone().unwrap_or_else(|| {
            dirs::state_dir()
                .or_else(dirs::data_local_dir)
                .unwrap_or_else(|| PathBuf::from("."))
                .join("stillwater-doctor")
                .join("active-tab")
        })
    }
}

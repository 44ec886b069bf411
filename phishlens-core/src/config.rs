use crate::error::Result;
use crate::report::DEFAULT_REPORT_FILE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_DIR: &str = "~/.config/phishlens/";
pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client settings, stored as JSON under the config directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the classification service.
    pub server_url: String,
    pub timeout_secs: u64,
    /// Where the share dialog writes the PDF report.
    pub report_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            report_path: PathBuf::from(DEFAULT_REPORT_FILE),
        }
    }
}

impl Settings {
    /// `config.json` inside `dir`, with `~` expanded.
    pub fn path_in(dir: &str) -> PathBuf {
        let expanded = shellexpand::tilde(dir);
        Path::new(expanded.as_ref()).join(CONFIG_FILE)
    }

    pub fn default_path() -> PathBuf {
        Self::path_in(DEFAULT_CONFIG_DIR)
    }

    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    /// Reads settings from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Applies command-line overrides on top of the file values.
    pub fn with_overrides(mut self, server_url: Option<&str>, timeout_secs: Option<u64>) -> Self {
        if let Some(server_url) = server_url {
            self.server_url = server_url.to_string();
        }
        if let Some(timeout_secs) = timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        self
    }
}

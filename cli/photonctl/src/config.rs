//! Configuration management.
//!
//! Handles:
//! - Controller target endpoint
//! - Authentication token storage
//! - Selected tenant/project

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Configuration file name.
const CONFIG_FILE: &str = "config.json";

/// Get the config directory path.
fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "photon", "photonctl")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Controller endpoint URL.
    #[serde(default = "default_target")]
    pub target: String,

    /// Auth token, stored alongside the target it was issued for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Selected tenant name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,

    /// Selected project name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

fn default_target() -> String {
    std::env::var("PHOTON_TARGET").unwrap_or_else(|_| "http://localhost:9000".to_string())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: default_target(),
            token: None,
            tenant: None,
            project: None,
        }
    }
}

impl Config {
    /// Load config from disk, or return default.
    pub fn load() -> Result<Self> {
        let path = config_dir()?.join(CONFIG_FILE);

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {path:?}"))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {path:?}"))
    }

    /// Get the controller target URL.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Save config to disk.
    ///
    /// The file carries the auth token, so it gets restrictive permissions
    /// on Unix.
    pub fn save(&self) -> Result<()> {
        let dir = config_dir()?;
        fs::create_dir_all(&dir)?;

        let path = dir.join(CONFIG_FILE);
        let contents = serde_json::to_string_pretty(self)?;

        #[cfg(unix)]
        {
            use std::io::Write;
            use std::os::unix::fs::OpenOptionsExt;

            let mut file = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&path)?;
            file.write_all(contents.as_bytes())?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&path, contents)
                .with_context(|| format!("Failed to write config to {path:?}"))?;
        }

        Ok(())
    }
}

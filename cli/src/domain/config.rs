//! Domain types and validators for shipctl configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::InstallerError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_AGENT: &str = "filebeat";
pub const DEFAULT_TEMP_DIR: &str = "/tmp";
pub const DEFAULT_STATE_PATH: &str = "/var/lib/shipctl/runtime.json";
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 600;

static AGENT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // literal pattern
    Regex::new(r"^[a-z0-9][a-z0-9_-]{0,62}$").expect("valid agent name regex")
});

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `/etc/shipctl/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ShipctlConfig {
    /// Service / package name of the agent.
    pub agent: String,
    /// Package download directory. Defaults to `/opt/<agent>`.
    pub install_path: Option<PathBuf>,
    /// Canonical config path. Defaults to `/etc/<agent>/<agent>.yml`.
    pub config_path: Option<PathBuf>,
    /// Scratch directory for downloads, rendered configs and lock files.
    pub temp_dir: PathBuf,
    /// Run system-path commands through `sudo`.
    pub use_sudo: bool,
    /// Per-command timeout; a process running longer is killed.
    pub command_timeout_secs: u64,
    /// Extra attempts for the package manager command.
    pub package_retries: u32,
    /// Runtime-property store file.
    pub state_path: PathBuf,
}

impl Default for ShipctlConfig {
    fn default() -> Self {
        Self {
            agent: DEFAULT_AGENT.to_string(),
            install_path: None,
            config_path: None,
            temp_dir: PathBuf::from(DEFAULT_TEMP_DIR),
            use_sudo: true,
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
            package_retries: 0,
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
        }
    }
}

impl ShipctlConfig {
    #[must_use]
    pub fn install_path(&self) -> PathBuf {
        self.install_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("/opt").join(&self.agent))
    }

    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config_path.clone().unwrap_or_else(|| {
            PathBuf::from("/etc")
                .join(&self.agent)
                .join(format!("{}.yml", self.agent))
        })
    }

    /// Fixed scratch file the rendered config is written to before the move.
    #[must_use]
    pub fn rendered_config_temp_path(&self) -> PathBuf {
        self.temp_dir.join(format!("{}.conf", self.agent))
    }

    /// # Errors
    ///
    /// Returns an error when a field holds a value shipctl cannot act on.
    pub fn validate(&self) -> Result<()> {
        validate_agent_name(&self.agent)?;
        anyhow::ensure!(
            self.command_timeout_secs > 0,
            "command_timeout_secs must be greater than 0"
        );
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Agent names become path components and service names.
///
/// # Errors
///
/// Returns `UnsupportedPlatform` for names outside `^[a-z0-9][a-z0-9_-]{0,62}$`.
pub fn validate_agent_name(name: &str) -> Result<(), InstallerError> {
    if AGENT_NAME.is_match(name) {
        Ok(())
    } else {
        Err(InstallerError::UnsupportedPlatform(format!(
            "invalid agent name '{name}': must match ^[a-z0-9][a-z0-9_-]{{0,62}}$"
        )))
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────

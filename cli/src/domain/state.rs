//! Properties remembered between the `install` and `start` operations.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-instance runtime properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeProperties {
    /// Directory the package was downloaded into by the last `install`.
    pub install_path: Option<PathBuf>,
    /// Canonical config path written by the last `install` / `configure`.
    pub config_path: Option<PathBuf>,
    /// When the last successful `install` finished.
    pub installed_at: Option<DateTime<Utc>>,
}

/// Instance ids become keys in the state file; keep them printable.
///
/// # Errors
///
/// Returns an error for empty ids or ids with whitespace or control characters.
pub fn validate_instance_id(id: &str) -> anyhow::Result<()> {
    anyhow::ensure!(
        !id.is_empty() && id.len() <= 128,
        "instance id must be 1-128 characters"
    );
    anyhow::ensure!(
        id.chars().all(|c| c.is_ascii_graphic()),
        "instance id '{id}' must not contain whitespace or control characters"
    );
    Ok(())
}

//! Typed domain error enum.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! `InstallerError` implements `thiserror::Error` and converts to
//! `anyhow::Error` via the `?` operator; callers recover the variant with
//! `anyhow::Error::downcast_ref`.

use thiserror::Error;

use crate::domain::command::CommandResult;

/// Failures surfaced by the install / configure / start operations.
#[derive(Debug, Error)]
pub enum InstallerError {
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Install path {0} already exists as a file, can't create a directory there.")]
    PathConflict(String),

    #[error("Download failed: {0}")]
    DownloadError(String),

    #[error("Cannot render configuration: {0}")]
    TemplateRenderError(String),

    #[error("Config file {0} doesn't exist. Run 'shipctl install' or 'shipctl configure' first.")]
    MissingConfig(String),

    #[error("Command failed after {} attempt(s): {} (exit code {}): {}",
        .0.attempts, .0.command_line(), .0.exit_code, .0.stderr_lossy().trim())]
    CommandFailure(Box<CommandResult>),

    #[error("Another shipctl run holds the lock for {path} ({lock}).")]
    InstallInProgress { path: String, lock: String },
}

impl InstallerError {
    /// Returns the failed command's result when this is a `CommandFailure`.
    #[must_use]
    pub fn command_result(&self) -> Option<&CommandResult> {
        match self {
            Self::CommandFailure(result) => Some(result),
            _ => None,
        }
    }
}

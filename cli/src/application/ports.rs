//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`: never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::Result;

use crate::domain::{HostPlatform, RuntimeProperties, ShipctlConfig};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
///
/// Implementations run `program` directly with `args`; they never go through
/// a shell.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: std::time::Duration,
    ) -> Result<Output>;
}

// ── Download Ports ────────────────────────────────────────────────────────────

/// Streams remote packages to local disk.
#[allow(async_fn_in_trait)]
pub trait Downloader {
    /// Download `url` into a new, uniquely named file inside `temp_dir`
    /// whose name ends with `filename`, and return that file's path.
    ///
    /// # Errors
    ///
    /// Returns `InstallerError::DownloadError` on malformed URLs, transport
    /// failures and non-2xx responses.
    async fn download(&self, url: &str, temp_dir: &Path, filename: &str) -> Result<PathBuf>;
}

/// Retrieves user-supplied resources such as config templates.
#[allow(async_fn_in_trait)]
pub trait ResourceFetcher {
    /// Fetch the text behind `reference` (a local path or `http(s)://` URL).
    async fn fetch_text(&self, reference: &str) -> Result<String>;
}

// ── Host Ports ────────────────────────────────────────────────────────────────

/// Detects the host operating system and distribution.
pub trait PlatformProbe {
    /// # Errors
    ///
    /// Returns an error if the distribution cannot be determined on Linux.
    fn detect(&self) -> Result<HostPlatform>;
}

/// Verb passed to a service manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Start,
    Restart,
}

impl ServiceAction {
    #[must_use]
    pub fn verb(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Restart => "restart",
        }
    }
}

/// A service-management capability (systemd, SysV `service`, or a test fake).
///
/// Providers only describe the command; the controller runs it.
pub trait ServiceManager {
    /// Short provider name for logs, e.g. `systemd`.
    fn name(&self) -> &'static str;
    /// Argv that applies `action` to `service` (without `sudo`).
    fn command(&self, service: &str, action: ServiceAction) -> Vec<String>;
}

/// Service managers chosen once at startup.
///
/// When the primary fails, the fallback (if any) is asked to `restart`.
pub struct ServiceManagers {
    pub primary: Box<dyn ServiceManager>,
    pub fallback: Option<Box<dyn ServiceManager>>,
}

/// Abstracts the local filesystem queries and writes the services need.
pub trait LocalFs {
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    /// Write `content` to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write(&self, path: &Path, content: &[u8]) -> Result<()>;
    /// # Errors
    ///
    /// Returns an error if `path` exists but cannot be removed.
    fn remove_file(&self, path: &Path) -> Result<()>;
}

/// Guards an install path against overlapping runs.
pub trait InstallLocker {
    /// Acquire the lock for `install_path`.
    ///
    /// Returns a guard that releases the lock when dropped.
    ///
    /// # Errors
    ///
    /// Returns `InstallerError::InstallInProgress` if another run holds it.
    fn acquire(&self, install_path: &Path) -> Result<Box<dyn std::any::Any>>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait: no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── State and Config Ports ────────────────────────────────────────────────────

/// The orchestration framework's per-instance key/value memory.
#[allow(async_fn_in_trait)]
pub trait RuntimePropertyStore {
    /// Load the instance's properties, returning `None` if none were saved.
    async fn load_async(&self) -> Result<Option<RuntimeProperties>>;
    /// Persist the instance's properties, replacing previous values.
    async fn save_async(&self, props: &RuntimeProperties) -> Result<()>;
}

/// Loads shipctl's own settings.
pub trait ConfigStore {
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    fn load(&self) -> Result<ShipctlConfig>;
    /// # Errors
    ///
    /// Returns an error if the path cannot be determined.
    fn path(&self) -> Result<PathBuf>;
}

//! Application context: unified state passed to every command handler.
//!
//! Built once in `Cli::run()` from the settings file and the global flags.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{ConfigStore, ProgressReporter};
use crate::application::services::installer::Installer;
use crate::domain::ShipctlConfig;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::YamlConfigStore;
use crate::infra::download::{HttpDownloader, TemplateFetcher};
use crate::infra::fs::{FileInstallLocker, LocalFs};
use crate::infra::state::JsonPropertyStore;
use crate::output::OutputContext;

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    pub output: OutputFlags,
    /// Run privileged commands without `sudo` (already root, or a container).
    pub no_sudo: bool,
    /// Runtime-property namespace.
    pub instance: String,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Effective settings after CLI overrides.
    pub config: ShipctlConfig,
    pub runner: TokioCommandRunner,
    pub store: JsonPropertyStore,
    pub locker: FileInstallLocker,
    /// Text of the bundled config template.
    pub bundled_template: &'static str,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be parsed, the instance id
    /// is invalid, or the bundled template is missing.
    pub fn new(flags: &AppFlags) -> Result<Self> {
        let mut config = YamlConfigStore.load().context("loading shipctl settings")?;
        if flags.no_sudo {
            config.use_sudo = false;
        }
        tracing::debug!(?config, instance = %flags.instance, "settings loaded");

        let store = JsonPropertyStore::new(config.state_path.clone(), &flags.instance)?;
        Ok(Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            runner: TokioCommandRunner::new(Duration::from_secs(config.command_timeout_secs)),
            locker: FileInstallLocker::new(config.temp_dir.clone()),
            bundled_template: crate::infra::assets::default_template()?,
            store,
            config,
        })
    }

    /// The use-case facade wired to the production adapters.
    #[must_use]
    pub fn installer<'a>(
        &'a self,
        reporter: &'a dyn ProgressReporter,
    ) -> Installer<
        'a,
        TokioCommandRunner,
        HttpDownloader,
        TemplateFetcher,
        LocalFs,
        JsonPropertyStore,
        FileInstallLocker,
    > {
        Installer {
            runner: &self.runner,
            downloader: &HttpDownloader,
            fetcher: &TemplateFetcher,
            fs: &LocalFs,
            store: &self.store,
            locker: &self.locker,
            reporter,
            config: &self.config,
            bundled_template: self.bundled_template,
        }
    }
}

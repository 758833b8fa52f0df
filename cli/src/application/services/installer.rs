//! The `install`, `configure`, `start` and `restart` use-cases.
//!
//! `Installer` wires the individual steps (resolve → fetch → install →
//! configure, and the service controller) to the injected ports. Every step
//! runs to completion before the next begins.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::application::ports::{
    CommandRunner, Downloader, InstallLocker, LocalFs, ProgressReporter, ResourceFetcher,
    RuntimePropertyStore,
};
use crate::application::services::configure::{ConfigTarget, configure};
use crate::application::services::exec::run_privileged;
use crate::application::services::fetch::fetch;
use crate::application::services::package::install_package;
use crate::application::services::service_control::{ServiceController, ServiceManagers};
use crate::domain::{
    CommandResult, HostPlatform, InstallRequest, InstallerError, Privilege, RenderedConfig,
    ResolvedPackage, RuntimeProperties, ShipctlConfig, TemplateSource, resolve_package,
};

/// Result of a completed `install`.
#[derive(Debug)]
pub struct InstallOutcome {
    pub package: ResolvedPackage,
    pub local_path: PathBuf,
    pub config: RenderedConfig,
}

/// Ports and settings shared by all operations.
pub struct Installer<'a, R, D, T, F, S, L> {
    pub runner: &'a R,
    pub downloader: &'a D,
    pub fetcher: &'a T,
    pub fs: &'a F,
    pub store: &'a S,
    pub locker: &'a L,
    pub reporter: &'a dyn ProgressReporter,
    pub config: &'a ShipctlConfig,
    /// Text of the config template shipped with shipctl.
    pub bundled_template: &'a str,
}

impl<R, D, T, F, S, L> Installer<'_, R, D, T, F, S, L>
where
    R: CommandRunner,
    D: Downloader,
    T: ResourceFetcher,
    F: LocalFs,
    S: RuntimePropertyStore,
    L: InstallLocker,
{
    fn privilege(&self) -> Privilege {
        Privilege::from_use_sudo(self.config.use_sudo)
    }

    async fn properties(&self) -> Result<RuntimeProperties> {
        Ok(self.store.load_async().await?.unwrap_or_default())
    }

    /// Download, install and configure the agent.
    ///
    /// Earlier steps are not rolled back when a later one fails.
    ///
    /// # Errors
    ///
    /// - `UnsupportedPlatform` on non-Linux hosts or unknown distributions.
    /// - `PathConflict` if `install_path` is an existing regular file.
    /// - `InstallInProgress` if another run holds the install lock.
    /// - `DownloadError`, `CommandFailure`, `TemplateRenderError` from the
    ///   individual steps.
    pub async fn install(
        &self,
        host: &HostPlatform,
        request: &InstallRequest,
    ) -> Result<InstallOutcome> {
        host.ensure_linux()?;
        let install_path = request.install_path.as_path();

        let mut props = self.properties().await?;
        props.install_path = Some(install_path.to_path_buf());
        self.store
            .save_async(&props)
            .await
            .context("recording install path")?;

        if self.fs.is_file(install_path) {
            return Err(InstallerError::PathConflict(install_path.display().to_string()).into());
        }
        let _lock = self.locker.acquire(install_path)?;

        if !self.fs.exists(install_path) {
            let dir = install_path.to_string_lossy();
            run_privileged(self.runner, self.privilege(), &["mkdir", "-p", dir.as_ref()]).await?;
        }

        let package = resolve_package(&request.distribution_id, request.download_url.as_deref())?;
        tracing::info!(
            distribution = %request.distribution_id,
            url = %package.url,
            kind = %package.kind,
            "package resolved"
        );

        self.reporter.step(&format!("Downloading {}...", package.filename));
        fetch(
            self.downloader,
            self.runner,
            self.fs,
            self.privilege(),
            &package.url,
            &self.config.temp_dir,
            install_path,
        )
        .await?;
        self.reporter.success(&format!("Downloaded {}", package.filename));

        let local_path = package.local_path(install_path);
        self.reporter.step(&format!("Installing {} package...", package.kind));
        install_package(
            self.runner,
            self.privilege(),
            package.kind,
            &local_path,
            self.config.package_retries,
        )
        .await?;
        self.reporter.success(&format!("{} installed", self.config.agent));

        let config = self
            .render_and_apply(request.config_template_ref.as_deref(), &request.config_inputs)
            .await?;

        props.config_path = Some(config.destination_path.clone());
        props.installed_at = Some(chrono::Utc::now());
        self.store
            .save_async(&props)
            .await
            .context("recording install result")?;

        Ok(InstallOutcome {
            package,
            local_path,
            config,
        })
    }

    /// Re-render the config only, under the install lock.
    ///
    /// # Errors
    ///
    /// `TemplateRenderError`, `InstallInProgress` or `CommandFailure`.
    pub async fn configure(
        &self,
        template_ref: Option<&str>,
        inputs: &Map<String, Value>,
    ) -> Result<RenderedConfig> {
        let mut props = self.properties().await?;
        let install_path = props
            .install_path
            .clone()
            .unwrap_or_else(|| self.config.install_path());
        let _lock = self.locker.acquire(&install_path)?;

        let config = self.render_and_apply(template_ref, inputs).await?;
        props.config_path = Some(config.destination_path.clone());
        self.store
            .save_async(&props)
            .await
            .context("recording config path")?;
        Ok(config)
    }

    async fn render_and_apply(
        &self,
        template_ref: Option<&str>,
        inputs: &Map<String, Value>,
    ) -> Result<RenderedConfig> {
        let source = TemplateSource::from_ref(template_ref);
        let config_path = self.config.config_path();
        let temp_path = self.config.rendered_config_temp_path();
        let target = ConfigTarget {
            temp_path: &temp_path,
            config_path: &config_path,
            privilege: self.privilege(),
        };

        self.reporter
            .step(&format!("Configuring {}...", config_path.display()));
        let rendered = configure(
            self.fetcher,
            self.runner,
            self.fs,
            &source,
            self.bundled_template,
            inputs,
            &target,
        )
        .await?;
        self.reporter
            .success(&format!("{} configured", config_path.display()));
        Ok(rendered)
    }

    /// Start the agent service.
    ///
    /// # Errors
    ///
    /// `MissingConfig` without a config file, `CommandFailure` otherwise.
    pub async fn start(&self, managers: &ServiceManagers) -> Result<CommandResult> {
        let config_path = self.active_config_path().await?;
        self.reporter
            .step(&format!("Starting {} service...", self.config.agent));
        let result = self.controller(managers, &config_path).start().await?;
        self.reporter
            .success(&format!("{} service is up", self.config.agent));
        Ok(result)
    }

    /// Restart the agent service so it picks up a new config.
    ///
    /// # Errors
    ///
    /// Same as [`Self::start`].
    pub async fn restart(&self, managers: &ServiceManagers) -> Result<CommandResult> {
        let config_path = self.active_config_path().await?;
        self.reporter
            .step(&format!("Restarting {} service...", self.config.agent));
        let result = self.controller(managers, &config_path).restart().await?;
        self.reporter
            .success(&format!("{} service restarted", self.config.agent));
        Ok(result)
    }

    // The path recorded by the last install/configure wins over settings.
    async fn active_config_path(&self) -> Result<PathBuf> {
        match self.properties().await?.config_path {
            Some(path) => Ok(path),
            None => {
                let path = self.config.config_path();
                self.reporter.warn(&format!(
                    "No config recorded for this instance, using {}",
                    path.display()
                ));
                Ok(path)
            }
        }
    }

    fn controller<'c>(
        &'c self,
        managers: &'c ServiceManagers,
        config_path: &'c Path,
    ) -> ServiceController<'c, R, F> {
        ServiceController {
            runner: self.runner,
            fs: self.fs,
            managers,
            service: &self.config.agent,
            config_path,
            privilege: self.privilege(),
        }
    }
}

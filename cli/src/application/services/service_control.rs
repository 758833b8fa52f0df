//! Agent service start / restart through an injected service manager.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::Path;

use anyhow::Result;

pub use crate::application::ports::ServiceManagers;
use crate::application::ports::{CommandRunner, LocalFs, ServiceAction, ServiceManager};
use crate::application::services::exec::run_command;
use crate::domain::{CommandResult, InstallerError, Privilege, RetryPolicy};

/// Starts or restarts one service, after checking its config file exists.
pub struct ServiceController<'a, R: CommandRunner, F: LocalFs> {
    pub runner: &'a R,
    pub fs: &'a F,
    pub managers: &'a ServiceManagers,
    pub service: &'a str,
    pub config_path: &'a Path,
    pub privilege: Privilege,
}

impl<R: CommandRunner, F: LocalFs> ServiceController<'_, R, F> {
    /// # Errors
    ///
    /// `MissingConfig` without the config file, `CommandFailure` when every
    /// manager failed.
    pub async fn start(&self) -> Result<CommandResult> {
        self.apply(ServiceAction::Start).await
    }

    /// # Errors
    ///
    /// Same as [`Self::start`].
    pub async fn restart(&self) -> Result<CommandResult> {
        self.apply(ServiceAction::Restart).await
    }

    async fn apply(&self, action: ServiceAction) -> Result<CommandResult> {
        if !self.fs.is_file(self.config_path) {
            return Err(
                InstallerError::MissingConfig(self.config_path.display().to_string()).into(),
            );
        }

        let primary = &self.managers.primary;
        let Some(fallback) = &self.managers.fallback else {
            return self.run(primary.as_ref(), action, false).await;
        };

        let result = self.run(primary.as_ref(), action, true).await?;
        if result.success() {
            return Ok(result);
        }
        tracing::warn!(
            manager = primary.name(),
            fallback = fallback.name(),
            exit_code = result.exit_code,
            "service manager failed, falling back"
        );
        self.run(fallback.as_ref(), ServiceAction::Restart, false).await
    }

    async fn run(
        &self,
        manager: &dyn ServiceManager,
        action: ServiceAction,
        ignore_failures: bool,
    ) -> Result<CommandResult> {
        let argv = manager.command(self.service, action);
        tracing::info!(manager = manager.name(), action = action.verb(), service = self.service, "service action");
        let policy = RetryPolicy {
            retries: 0,
            ignore_failures,
        };
        run_command(self.runner, &self.privilege.command(&argv), policy).await
    }
}

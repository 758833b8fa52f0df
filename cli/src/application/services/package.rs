//! Native package installation (`dpkg` / `rpm`).
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::CommandRunner;
use crate::application::services::exec::run_command;
use crate::domain::{CommandResult, PackageKind, Privilege, RetryPolicy};

/// Install a local package file with the host's package manager.
///
/// Not transactional: a half-applied install is left to the package
/// manager's own recovery. `retries` extra attempts cover a package manager
/// whose lock is briefly held by another process.
///
/// # Errors
///
/// Returns `InstallerError::CommandFailure` if the package manager exits
/// non-zero on every attempt.
pub async fn install_package(
    runner: &impl CommandRunner,
    privilege: Privilege,
    kind: PackageKind,
    local_path: &Path,
    retries: u32,
) -> Result<CommandResult> {
    let path = local_path.to_string_lossy();
    tracing::info!(%kind, path = %path, retries, "installing package");
    let command = privilege.command(&kind.install_argv(&path));
    let result = run_command(runner, &command, RetryPolicy::with_retries(retries)).await?;
    tracing::info!(%kind, "package installed");
    Ok(result)
}

//! Command execution with bounded retry.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::Result;

use crate::application::ports::CommandRunner;
use crate::domain::command::{NO_EXIT_CODE, SPAWN_FAILURE_EXIT_CODE};
use crate::domain::{CommandResult, InstallerError, Privilege, RetryPolicy, split_command};

/// Run a shell-style command line, retrying up to `policy.retries` times.
///
/// The line is split into argv and executed directly; no shell is involved.
/// A program that cannot be spawned (or times out) counts as a failed
/// attempt with exit code 127.
///
/// # Errors
///
/// - If the command line cannot be parsed.
/// - `InstallerError::CommandFailure` when every attempt failed and
///   `policy.ignore_failures` is false. With `ignore_failures` the failed
///   result is returned as `Ok` for the caller to inspect.
pub async fn run_command(
    runner: &impl CommandRunner,
    command: &str,
    policy: RetryPolicy,
) -> Result<CommandResult> {
    let argv = split_command(command)?;
    let Some((program, rest)) = argv.split_first() else {
        anyhow::bail!("empty command line");
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    let max_attempts = policy.max_attempts();

    let mut last = None;
    for attempt in 1..=max_attempts {
        tracing::debug!(command, attempt, "running command");
        let result = match runner.run(program, &args).await {
            Ok(output) => CommandResult {
                argv: argv.clone(),
                exit_code: output.status.code().unwrap_or(NO_EXIT_CODE),
                stdout: output.stdout,
                stderr: output.stderr,
                attempts: attempt,
            },
            Err(e) => CommandResult {
                argv: argv.clone(),
                exit_code: SPAWN_FAILURE_EXIT_CODE,
                stdout: Vec::new(),
                stderr: format!("{e:#}").into_bytes(),
                attempts: attempt,
            },
        };
        if result.success() {
            return Ok(result);
        }
        if attempt < max_attempts {
            tracing::warn!(
                command,
                exit_code = result.exit_code,
                left = max_attempts - attempt,
                "command failed, retrying"
            );
        }
        last = Some(result);
    }

    let Some(result) = last else {
        anyhow::bail!("command was never attempted: {command}");
    };
    if policy.ignore_failures {
        tracing::warn!(command, exit_code = result.exit_code, "command failed, continuing");
        return Ok(result);
    }
    tracing::error!(
        command,
        exit_code = result.exit_code,
        stderr = %result.stderr_lossy().trim(),
        "command failed"
    );
    Err(InstallerError::CommandFailure(Box::new(result)).into())
}

/// Run `argv` with the given privilege, failing on a non-zero exit.
///
/// # Errors
///
/// Same as [`run_command`] with a fatal single-attempt policy.
pub async fn run_privileged<S: AsRef<str>>(
    runner: &impl CommandRunner,
    privilege: Privilege,
    argv: &[S],
) -> Result<CommandResult> {
    run_command(runner, &privilege.command(argv), RetryPolicy::fatal()).await
}

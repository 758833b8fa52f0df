//! Command-line values: argv splitting, privilege elevation, retry policy and
//! the captured result of a finished command.
//!
//! Pure functions only: no process spawning happens here.

use anyhow::{Context, Result};

/// Exit code recorded when a program could not be spawned at all.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 127;

/// Exit code recorded when a process was killed by a signal or a timeout.
pub const NO_EXIT_CODE: i32 = -1;

/// Captured outcome of one command, after all retry attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// The argv that was executed (program first).
    pub argv: Vec<String>,
    /// Exit code of the last attempt.
    pub exit_code: i32,
    /// Full stdout of the last attempt.
    pub stdout: Vec<u8>,
    /// Full stderr of the last attempt.
    pub stderr: Vec<u8>,
    /// Number of invocations made, `retries + 1` at most.
    pub attempts: u32,
}

impl CommandResult {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// The argv joined back into a shell-quoted line, for messages and logs.
    #[must_use]
    pub fn command_line(&self) -> String {
        shell_words::join(&self.argv)
    }

    #[must_use]
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    #[must_use]
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// How many times to re-run a failing command and what to do once the
/// attempts are exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure.
    pub retries: u32,
    /// Return the failed result instead of a `CommandFailure` error.
    pub ignore_failures: bool,
}

impl RetryPolicy {
    /// Single attempt, failure is fatal.
    #[must_use]
    pub fn fatal() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_retries(retries: u32) -> Self {
        Self {
            retries,
            ignore_failures: false,
        }
    }

    #[must_use]
    pub fn ignoring_failures(mut self) -> Self {
        self.ignore_failures = true;
        self
    }

    /// Total number of invocations this policy allows.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

/// Whether commands that touch system paths run through `sudo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    Sudo,
    Unprivileged,
}

impl Privilege {
    #[must_use]
    pub fn from_use_sudo(use_sudo: bool) -> Self {
        if use_sudo { Self::Sudo } else { Self::Unprivileged }
    }

    /// Prefix `argv` with `sudo` when elevation is enabled, and render it as
    /// a single quoted command line.
    #[must_use]
    pub fn command<S: AsRef<str>>(self, argv: &[S]) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(argv.len() + 1);
        if self == Self::Sudo {
            parts.push("sudo");
        }
        parts.extend(argv.iter().map(AsRef::as_ref));
        shell_words::join(parts)
    }
}

/// Split a shell-style command line into argv tokens.
///
/// Quoting follows POSIX shell word rules, but no shell is ever invoked, so
/// `;`, `|` and `$VAR` are passed through literally.
///
/// # Errors
///
/// Returns an error on unbalanced quotes or an empty command line.
pub fn split_command(command: &str) -> Result<Vec<String>> {
    let argv = shell_words::split(command)
        .with_context(|| format!("cannot parse command line: {command}"))?;
    anyhow::ensure!(!argv.is_empty(), "empty command line");
    Ok(argv)
}

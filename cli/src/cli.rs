//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;

/// Install, configure and start a log-shipping agent on Linux hosts
#[derive(Parser)]
#[command(
    name = "shipctl",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Run privileged commands without sudo
    #[arg(long, global = true)]
    pub no_sudo: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Namespace for the properties recorded between operations
    #[arg(long, global = true, env = "SHIPCTL_INSTANCE", default_value = "default")]
    pub instance: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Download, install and configure the agent
    Install(commands::install::InstallArgs),

    /// Re-render the agent config
    Configure(commands::configure::ConfigureArgs),

    /// Start the agent service
    Start,

    /// Restart the agent service
    Restart,

    /// Show version
    Version,
}

impl Cli {
    /// Default `tracing` filter directive for the chosen verbosity.
    #[must_use]
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            quiet,
            no_color,
            no_sudo,
            instance,
            command,
            ..
        } = self;

        if let Command::Version = command {
            commands::version::run();
            return Ok(());
        }

        let app = AppContext::new(&AppFlags {
            output: OutputFlags { no_color, quiet },
            no_sudo,
            instance,
        })?;
        match command {
            Command::Install(args) => commands::install::run(&args, &app).await,
            Command::Configure(args) => commands::configure::run(&args, &app).await,
            Command::Start => commands::start::start(&app).await,
            Command::Restart => commands::start::restart(&app).await,
            Command::Version => Ok(()),
        }
    }
}

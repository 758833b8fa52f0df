//! `shipctl install`: download, install and configure the agent.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::PlatformProbe;
use crate::commands::ConfigArgs;
use crate::domain::InstallRequest;
use crate::infra::platform::OsReleaseProbe;

/// Arguments for the install command.
#[derive(Args, Default)]
pub struct InstallArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Directory the package is downloaded into (default: /opt/<agent>)
    #[arg(long, value_name = "DIR")]
    pub install_path: Option<std::path::PathBuf>,

    /// Package URL to use instead of the pinned one for this distribution
    #[arg(long, value_name = "URL")]
    pub download_url: Option<String>,

    /// Distribution id to assume instead of reading /etc/os-release
    /// (only consulted without --download-url)
    #[arg(long, value_name = "ID")]
    pub distribution: Option<String>,
}

/// Run `shipctl install`.
///
/// # Errors
///
/// Returns an error if host detection or any install step fails.
pub async fn run(args: &InstallArgs, app: &AppContext) -> Result<()> {
    let config_inputs = args.config.load_inputs()?;
    let url_given = args
        .download_url
        .as_deref()
        .is_some_and(|url| !url.trim().is_empty());
    let host = OsReleaseProbe::new(args.distribution.clone())
        .distribution_optional(url_given)
        .detect()?;

    let request = InstallRequest {
        distribution_id: host.distribution_id.clone(),
        install_path: args
            .install_path
            .clone()
            .unwrap_or_else(|| app.config.install_path()),
        download_url: args.download_url.clone(),
        config_inputs,
        config_template_ref: args.config.config_template.clone(),
    };

    let reporter = app.output.reporter();
    let outcome = app.installer(&reporter).install(&host, &request).await?;
    drop(reporter);

    let ctx = &app.output;
    ctx.success(&format!("{} installed.", app.config.agent));
    ctx.summary(&[
        ("Package:", outcome.local_path.display().to_string()),
        ("Config:", outcome.config.destination_path.display().to_string()),
        ("Next:", "shipctl start".to_string()),
    ]);
    Ok(())
}

//! `shipctl configure`: re-render the agent config only.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::commands::ConfigArgs;

/// Arguments for the configure command.
#[derive(Args, Default)]
pub struct ConfigureArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Run `shipctl configure`.
///
/// # Errors
///
/// Returns an error if the inputs, the template or the move fail.
pub async fn run(args: &ConfigureArgs, app: &AppContext) -> Result<()> {
    let inputs = args.config.load_inputs()?;
    let reporter = app.output.reporter();
    let rendered = app
        .installer(&reporter)
        .configure(args.config.config_template.as_deref(), &inputs)
        .await?;
    drop(reporter);

    tracing::debug!(bytes = rendered.rendered_bytes.len(), "configure finished");
    app.output.summary(&[
        ("Config:", rendered.destination_path.display().to_string()),
        ("Apply with:", "shipctl restart".to_string()),
    ]);
    Ok(())
}

//! Agent configuration: render a template with the user's inputs and move
//! the result onto the canonical config path.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::application::ports::{CommandRunner, LocalFs, ResourceFetcher};
use crate::application::services::exec::run_privileged;
use crate::domain::render::render_template;
use crate::domain::{Privilege, RenderedConfig, TemplateSource};

/// Where the rendered config goes and how it gets there.
pub struct ConfigTarget<'a> {
    /// Fixed scratch file the rendered config is written to first.
    pub temp_path: &'a Path,
    /// Canonical config path the agent reads.
    pub config_path: &'a Path,
    pub privilege: Privilege,
}

/// Render the template selected by `source` with `inputs`.
///
/// `bundled` is the text of the template shipped with shipctl.
///
/// # Errors
///
/// - If a referenced template cannot be fetched.
/// - `InstallerError::TemplateRenderError` if rendering fails.
pub async fn render_config(
    fetcher: &impl ResourceFetcher,
    source: &TemplateSource,
    bundled: &str,
    inputs: &Map<String, Value>,
    destination: &Path,
) -> Result<RenderedConfig> {
    let rendered = match source {
        TemplateSource::Bundled => render_template(bundled, inputs)?,
        TemplateSource::Reference(reference) => {
            let template = fetcher
                .fetch_text(reference)
                .await
                .with_context(|| format!("fetching config template {reference}"))?;
            render_template(&template, inputs)?
        }
    };
    Ok(RenderedConfig {
        rendered_bytes: rendered.into_bytes(),
        destination_path: destination.to_path_buf(),
    })
}

/// Write a rendered config to the scratch file and move it over the
/// canonical path, creating the parent directory when missing.
///
/// # Errors
///
/// Returns an error if the scratch file cannot be written, or
/// `InstallerError::CommandFailure` if a privileged command fails.
pub async fn apply_config(
    runner: &impl CommandRunner,
    fs: &impl LocalFs,
    config: &RenderedConfig,
    target: &ConfigTarget<'_>,
) -> Result<()> {
    fs.write(target.temp_path, &config.rendered_bytes)?;

    let dest = config.destination_path.to_string_lossy();
    if let Some(parent) = config.destination_path.parent() {
        if !fs.exists(parent) {
            let parent = parent.to_string_lossy();
            run_privileged(runner, target.privilege, &["mkdir", "-p", parent.as_ref()]).await?;
        }
    }
    let temp = target.temp_path.to_string_lossy();
    run_privileged(runner, target.privilege, &["mv", "-f", temp.as_ref(), dest.as_ref()]).await?;
    tracing::info!(path = %dest, bytes = config.rendered_bytes.len(), "config file written");
    Ok(())
}

/// Render, then apply. A render failure writes nothing, so the previous
/// canonical config survives.
///
/// # Errors
///
/// See [`render_config`] and [`apply_config`].
pub async fn configure(
    fetcher: &impl ResourceFetcher,
    runner: &impl CommandRunner,
    fs: &impl LocalFs,
    source: &TemplateSource,
    bundled: &str,
    inputs: &Map<String, Value>,
    target: &ConfigTarget<'_>,
) -> Result<RenderedConfig> {
    let rendered = render_config(fetcher, source, bundled, inputs, target.config_path).await?;
    apply_config(runner, fs, &rendered, target).await?;
    Ok(rendered)
}

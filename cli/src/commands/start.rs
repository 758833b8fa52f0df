//! `shipctl start` / `shipctl restart`: bring the agent service up.

use anyhow::Result;

use crate::app::AppContext;
use crate::infra::service_manager::detect_service_managers;

/// Run `shipctl start`.
///
/// # Errors
///
/// Returns an error if the config file is missing or every service manager
/// failed.
pub async fn start(app: &AppContext) -> Result<()> {
    let managers = detect_service_managers();
    let reporter = app.output.reporter();
    app.installer(&reporter).start(&managers).await?;
    Ok(())
}

/// Run `shipctl restart`.
///
/// # Errors
///
/// Same as [`start`].
pub async fn restart(app: &AppContext) -> Result<()> {
    let managers = detect_service_managers();
    let reporter = app.output.reporter();
    app.installer(&reporter).restart(&managers).await?;
    Ok(())
}

//! Package download: stream to a temp file, then move it into place with
//! elevated privilege.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::{CommandRunner, Downloader, LocalFs};
use crate::application::services::exec::run_privileged;
use crate::domain::Privilege;
use crate::domain::platform::filename_from_url;

/// Download `url` and relocate it into `destination_dir`.
///
/// Returns the local file name, which is always the URL's last path segment.
/// A download that cannot be moved into place is removed from `temp_dir`.
///
/// # Errors
///
/// - `InstallerError::DownloadError` for a missing/malformed URL or a failed
///   transfer.
/// - `InstallerError::CommandFailure` if the move into `destination_dir`
///   fails.
pub async fn fetch(
    downloader: &impl Downloader,
    runner: &impl CommandRunner,
    fs: &impl LocalFs,
    privilege: Privilege,
    url: &str,
    temp_dir: &Path,
    destination_dir: &Path,
) -> Result<String> {
    let filename = filename_from_url(Some(url))?;
    tracing::info!(url, "downloading package");
    let temp_path = downloader.download(url, temp_dir, &filename).await?;

    let destination = destination_dir.join(&filename);
    let temp = temp_path.to_string_lossy();
    let dest = destination.to_string_lossy();
    if let Err(e) = run_privileged(runner, privilege, &["mv", "-f", temp.as_ref(), dest.as_ref()]).await {
        if let Err(cleanup) = fs.remove_file(&temp_path) {
            tracing::warn!(path = %temp_path.display(), error = %cleanup, "failed to remove download");
        }
        return Err(e);
    }
    tracing::info!(path = %destination.display(), "package downloaded");
    Ok(filename)
}

//! HTTP infrastructure: implements `Downloader` and `ResourceFetcher` with
//! blocking `ureq` calls moved off the runtime via `spawn_blocking`.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::{Downloader, ResourceFetcher};
use crate::domain::InstallerError;

/// Bytes read from the response per write to disk.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Streams package downloads into the temp directory.
pub struct HttpDownloader;

impl Downloader for HttpDownloader {
    async fn download(&self, url: &str, temp_dir: &Path, filename: &str) -> Result<PathBuf> {
        let url = url.to_string();
        let temp_dir = temp_dir.to_path_buf();
        let filename = filename.to_string();
        tokio::task::spawn_blocking(move || download_to_temp(&url, &temp_dir, &filename))
            .await
            .context("download task panicked")?
    }
}

/// Blocking download of `url` into a uniquely named file in `temp_dir`.
///
/// The file is kept on success and removed on failure.
///
/// # Errors
///
/// Returns `InstallerError::DownloadError` for malformed URLs, transport
/// errors, non-2xx statuses and interrupted bodies.
pub fn download_to_temp(url: &str, temp_dir: &Path, filename: &str) -> Result<PathBuf> {
    let response = get(url)?;
    let mut reader = response.into_reader();

    let mut file = tempfile::Builder::new()
        .prefix(".shipctl-")
        .suffix(&format!("-{filename}"))
        .tempfile_in(temp_dir)
        .with_context(|| format!("creating download file in {}", temp_dir.display()))?;

    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut written: u64 = 0;
    loop {
        let n = reader
            .read(&mut buf)
            .map_err(|e| InstallerError::DownloadError(format!("{url}: reading body: {e}")))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])
            .with_context(|| format!("writing {}", file.path().display()))?;
        written += n as u64;
    }
    file.flush().context("flushing download")?;

    let (_, path) = file.keep().context("keeping downloaded file")?;
    tracing::debug!(url, path = %path.display(), bytes = written, "download complete");
    Ok(path)
}

fn get(url: &str) -> Result<ureq::Response> {
    match ureq::get(url).call() {
        Ok(response) if (200..300).contains(&response.status()) => Ok(response),
        Ok(response) => Err(InstallerError::DownloadError(format!(
            "{url}: HTTP status {}",
            response.status()
        ))
        .into()),
        Err(ureq::Error::Status(code, _)) => {
            Err(InstallerError::DownloadError(format!("{url}: HTTP status {code}")).into())
        }
        Err(e) => Err(InstallerError::DownloadError(format!("{url}: {e}")).into()),
    }
}

/// Fetches user templates from `http(s)://` URLs or local paths.
pub struct TemplateFetcher;

impl ResourceFetcher for TemplateFetcher {
    async fn fetch_text(&self, reference: &str) -> Result<String> {
        if is_remote(reference) {
            let url = reference.to_string();
            return tokio::task::spawn_blocking(move || {
                get(&url)?
                    .into_string()
                    .with_context(|| format!("reading {url}"))
            })
            .await
            .context("template fetch task panicked")?;
        }
        tokio::fs::read_to_string(reference)
            .await
            .with_context(|| format!("reading template {reference}"))
    }
}

fn is_remote(reference: &str) -> bool {
    let lower = reference.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

//! Host platform identification and package resolution.
//!
//! Pure functions only: `/etc/os-release` is read by the infra layer and
//! handed to [`parse_os_release`] as a string.

use std::fmt;

use crate::domain::error::InstallerError;
use crate::domain::request::ResolvedPackage;

/// Pinned agent package for Debian-family hosts.
pub const DEB_PACKAGE_URL: &str =
    "https://download.elastic.co/beats/filebeat/filebeat_1.2.3_amd64.deb";

/// Pinned agent package for Red Hat-family hosts.
pub const RPM_PACKAGE_URL: &str =
    "https://download.elastic.co/beats/filebeat/filebeat-1.2.3-x86_64.rpm";

/// Native package format understood by the host's package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    Deb,
    Rpm,
}

impl PackageKind {
    /// Infer the package kind from a URL or file name extension.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedPlatform` when the extension is neither `.deb`
    /// nor `.rpm`.
    pub fn from_url(url: &str) -> Result<Self, InstallerError> {
        let path = strip_query(url).to_ascii_lowercase();
        if path.ends_with(".deb") {
            Ok(Self::Deb)
        } else if path.ends_with(".rpm") {
            Ok(Self::Rpm)
        } else {
            Err(InstallerError::UnsupportedPlatform(format!(
                "cannot infer package type from {url} (expected a .deb or .rpm file)"
            )))
        }
    }

    /// Install command argv for a local package file.
    #[must_use]
    pub fn install_argv(self, local_path: &str) -> [&str; 3] {
        match self {
            Self::Deb => ["dpkg", "-i", local_path],
            Self::Rpm => ["rpm", "-vi", local_path],
        }
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Deb => "deb",
            Self::Rpm => "rpm",
        })
    }
}

/// Operating system and distribution of the target host, detected once and
/// passed explicitly into each operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPlatform {
    /// `std::env::consts::OS` of the host, e.g. `linux`.
    pub os: String,
    /// Lower-case distribution id, e.g. `ubuntu`, `centos`.
    pub distribution_id: String,
}

impl HostPlatform {
    #[must_use]
    pub fn linux(distribution_id: &str) -> Self {
        Self {
            os: "linux".to_string(),
            distribution_id: normalize_distribution_id(distribution_id),
        }
    }

    /// # Errors
    ///
    /// Returns `UnsupportedPlatform` on any non-Linux host.
    pub fn ensure_linux(&self) -> Result<(), InstallerError> {
        if self.os == "linux" {
            Ok(())
        } else {
            Err(InstallerError::UnsupportedPlatform(format!(
                "shipctl runs on Linux distributions only (host is {})",
                self.os
            )))
        }
    }
}

/// Lower-case and trim a distribution id, dropping surrounding quotes.
#[must_use]
pub fn normalize_distribution_id(id: &str) -> String {
    id.trim().trim_matches(['"', '\'']).to_ascii_lowercase()
}

/// Extract the `ID=` value from `/etc/os-release` content.
#[must_use]
pub fn parse_os_release(content: &str) -> Option<String> {
    content
        .lines()
        .filter_map(|line| line.trim().strip_prefix("ID="))
        .map(normalize_distribution_id)
        .find(|id| !id.is_empty())
}

/// Resolve the package to download for a distribution.
///
/// An override URL is used verbatim and its extension decides the package
/// kind; otherwise the distribution picks one of the pinned URLs.
///
/// # Errors
///
/// - `UnsupportedPlatform` for an unknown distribution or an override URL
///   that is neither `.deb` nor `.rpm`.
/// - `DownloadError` when the URL has no file name segment.
pub fn resolve_package(
    distribution_id: &str,
    override_url: Option<&str>,
) -> Result<ResolvedPackage, InstallerError> {
    let override_url = override_url.map(str::trim).filter(|u| !u.is_empty());
    let (url, kind) = match override_url {
        Some(url) => (url.to_string(), PackageKind::from_url(url)?),
        None => match normalize_distribution_id(distribution_id).as_str() {
            "ubuntu" | "debian" => (DEB_PACKAGE_URL.to_string(), PackageKind::Deb),
            "centos" | "redhat" => (RPM_PACKAGE_URL.to_string(), PackageKind::Rpm),
            other => {
                return Err(InstallerError::UnsupportedPlatform(format!(
                    "distribution '{other}' is not supported (supported: ubuntu, debian, centos, redhat)"
                )));
            }
        },
    };
    let filename = filename_from_url(Some(&url))?;
    Ok(ResolvedPackage {
        url,
        filename,
        kind,
    })
}

/// Last non-empty path segment of a URL, with query and fragment removed.
///
/// # Errors
///
/// Returns `DownloadError` for a missing or empty URL, or one whose path has
/// no file name.
pub fn filename_from_url(url: Option<&str>) -> Result<String, InstallerError> {
    let url = url
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| InstallerError::DownloadError("no download URL given".to_string()))?;
    let path = strip_query(url);
    let path = path.split_once("://").map_or(path, |(_, rest)| rest);
    // The first segment after the scheme is the host, never a file name.
    let mut segments = path.split('/');
    let _host = segments.next();
    segments
        .rfind(|s| !s.is_empty())
        .filter(|s| *s != "." && *s != "..")
        .map(ToString::to_string)
        .ok_or_else(|| {
            InstallerError::DownloadError(format!("URL has no file name to download: {url}"))
        })
}

fn strip_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

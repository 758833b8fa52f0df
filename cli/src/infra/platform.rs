//! Host detection: implements `PlatformProbe` from `std::env::consts::OS`
//! and `/etc/os-release`.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::PlatformProbe;
use crate::domain::HostPlatform;
use crate::domain::platform::{normalize_distribution_id, parse_os_release};

/// Standard location of the os-release file.
pub const OS_RELEASE_PATH: &str = "/etc/os-release";

pub struct OsReleaseProbe {
    os: String,
    os_release: PathBuf,
    distribution_override: Option<String>,
    distribution_optional: bool,
}

impl OsReleaseProbe {
    /// Probe for the running host. `distribution_override` skips
    /// `/etc/os-release` entirely.
    #[must_use]
    pub fn new(distribution_override: Option<String>) -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            os_release: PathBuf::from(OS_RELEASE_PATH),
            distribution_override,
            distribution_optional: false,
        }
    }

    /// Probe reading an explicit os-release file (used in tests).
    #[must_use]
    pub fn with_os_release(os: &str, os_release: PathBuf) -> Self {
        Self {
            os: os.to_string(),
            os_release,
            distribution_override: None,
            distribution_optional: false,
        }
    }

    /// With an explicit package URL the distribution is only informational:
    /// an unreadable os-release then yields an empty id instead of an error.
    #[must_use]
    pub fn distribution_optional(mut self, optional: bool) -> Self {
        self.distribution_optional = optional;
        self
    }

    fn read_distribution(&self) -> Result<String> {
        let content = std::fs::read_to_string(&self.os_release)
            .with_context(|| format!("reading {}", self.os_release.display()))?;
        parse_os_release(&content).with_context(|| {
            format!(
                "cannot determine distribution: no ID in {}",
                self.os_release.display()
            )
        })
    }
}

impl PlatformProbe for OsReleaseProbe {
    fn detect(&self) -> Result<HostPlatform> {
        if self.os != "linux" {
            return Ok(HostPlatform {
                os: self.os.clone(),
                distribution_id: String::new(),
            });
        }
        if let Some(id) = &self.distribution_override {
            return Ok(HostPlatform::linux(&normalize_distribution_id(id)));
        }
        match self.read_distribution() {
            Ok(id) => {
                tracing::debug!(distribution = %id, "host distribution detected");
                Ok(HostPlatform::linux(&id))
            }
            Err(e) if self.distribution_optional => {
                tracing::debug!(error = %format!("{e:#}"), "distribution unknown, package URL given");
                Ok(HostPlatform::linux(""))
            }
            Err(e) => Err(e),
        }
    }
}

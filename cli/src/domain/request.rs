//! Value types flowing through one install run.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::domain::platform::PackageKind;

/// Everything one `install` invocation needs. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    /// Distribution id used to pick the package when no URL override is set.
    pub distribution_id: String,
    /// Directory the package is downloaded into.
    pub install_path: PathBuf,
    /// Optional package URL overriding the pinned one.
    pub download_url: Option<String>,
    /// Template variables, arbitrarily nested.
    pub config_inputs: Map<String, Value>,
    /// Optional user template (local path or `http(s)://` URL).
    pub config_template_ref: Option<String>,
}

/// Package chosen for this host, before it is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    pub url: String,
    /// Last path segment of `url`; the name the file gets on disk.
    pub filename: String,
    pub kind: PackageKind,
}

impl ResolvedPackage {
    /// Where the package lands inside `install_path`.
    #[must_use]
    pub fn local_path(&self, install_path: &Path) -> PathBuf {
        install_path.join(&self.filename)
    }
}

/// Rendered configuration waiting to be moved onto the canonical path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedConfig {
    pub rendered_bytes: Vec<u8>,
    pub destination_path: PathBuf,
}

/// Which template the config is rendered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// The template bundled into the binary.
    Bundled,
    /// A user template fetched from a path or URL.
    Reference(String),
}

impl TemplateSource {
    #[must_use]
    pub fn from_ref(template_ref: Option<&str>) -> Self {
        match template_ref.map(str::trim) {
            Some(r) if !r.is_empty() => Self::Reference(r.to_string()),
            _ => Self::Bundled,
        }
    }
}

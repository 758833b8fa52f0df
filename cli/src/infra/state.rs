//! Infrastructure implementation of the `RuntimePropertyStore` port.
//!
//! `JsonPropertyStore` keeps one JSON document holding every instance's
//! properties. Loads and saves run through `tokio::task::spawn_blocking`
//! with an atomic write (temp file + rename).

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::RuntimePropertyStore;
use crate::domain::RuntimeProperties;
use crate::domain::state::validate_instance_id;

/// Env var overriding the state file location.
pub const STATE_PATH_ENV: &str = "SHIPCTL_STATE";

type Document = BTreeMap<String, RuntimeProperties>;

/// Runtime property store for one instance id.
#[derive(Clone)]
pub struct JsonPropertyStore {
    path: PathBuf,
    instance: String,
}

impl JsonPropertyStore {
    /// Store at `$SHIPCTL_STATE`, or `default_path` when unset.
    ///
    /// # Errors
    ///
    /// Returns an error if `instance` is not a valid instance id.
    pub fn new(default_path: PathBuf, instance: &str) -> Result<Self> {
        let path = std::env::var_os(STATE_PATH_ENV).map_or(default_path, PathBuf::from);
        Self::with_path(path, instance)
    }

    /// Store with an explicit path (used in tests).
    ///
    /// # Errors
    ///
    /// Returns an error if `instance` is not a valid instance id.
    pub fn with_path(path: PathBuf, instance: &str) -> Result<Self> {
        validate_instance_id(instance)?;
        Ok(Self {
            path,
            instance: instance.to_string(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read_document(&self) -> Result<Document> {
        if !self.path.exists() {
            return Ok(Document::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading state file {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing state file {}", self.path.display()))
    }

    fn load_sync(&self) -> Result<Option<RuntimeProperties>> {
        Ok(self.read_document()?.remove(&self.instance))
    }

    fn save_sync(&self, props: &RuntimeProperties) -> Result<()> {
        let mut document = self.read_document()?;
        document.insert(self.instance.clone(), props.clone());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(&document).context("serializing state")?;

        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, &content)
            .with_context(|| format!("writing temp file {}", temp_path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("setting permissions on {}", temp_path.display()))?;
        }

        std::fs::rename(&temp_path, &self.path)
            .with_context(|| format!("finalizing state file {}", self.path.display()))
    }
}

impl RuntimePropertyStore for JsonPropertyStore {
    async fn load_async(&self) -> Result<Option<RuntimeProperties>> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.load_sync())
            .await
            .context("state load task panicked")?
    }

    async fn save_async(&self, props: &RuntimeProperties) -> Result<()> {
        let store = self.clone();
        let props = props.clone();
        tokio::task::spawn_blocking(move || store.save_sync(&props))
            .await
            .context("state save task panicked")?
    }
}

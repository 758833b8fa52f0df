//! Infrastructure implementation of the `ConfigStore` port.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::application::ports::ConfigStore;
use crate::domain::ShipctlConfig;

/// Env var overriding the settings file location.
pub const CONFIG_PATH_ENV: &str = "SHIPCTL_CONFIG";

/// Settings file used when `SHIPCTL_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/shipctl/config.yaml";

/// Production implementation of `ConfigStore` that uses a YAML file on disk.
///
/// A missing file yields the defaults.
pub struct YamlConfigStore;

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<ShipctlConfig> {
        let path = self.path()?;
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(ShipctlConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let config: ShipctlConfig = if content.trim().is_empty() {
            ShipctlConfig::default()
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("cannot parse {}", path.display()))?
        };
        config
            .validate()
            .with_context(|| format!("invalid settings in {}", path.display()))?;
        Ok(config)
    }

    fn path(&self) -> Result<PathBuf> {
        if let Ok(val) = std::env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(val));
        }
        Ok(PathBuf::from(DEFAULT_CONFIG_PATH))
    }
}

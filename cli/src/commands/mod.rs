//! Command implementations

pub mod configure;
pub mod install;
pub mod start;
pub mod version;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Map, Value};

use crate::domain::render::parse_inputs;

/// Config rendering arguments shared by `install` and `configure`.
#[derive(Args, Default)]
pub struct ConfigArgs {
    /// YAML or JSON file with the template inputs
    #[arg(long, value_name = "FILE")]
    pub inputs: Option<PathBuf>,

    /// Template to render instead of the bundled one (path or http(s) URL)
    #[arg(long, value_name = "REF")]
    pub config_template: Option<String>,
}

impl ConfigArgs {
    /// Template inputs from `--inputs`, or an empty mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a mapping.
    pub fn load_inputs(&self) -> Result<Map<String, Value>> {
        self.inputs.as_deref().map_or_else(|| Ok(Map::new()), read_inputs)
    }
}

fn read_inputs(path: &Path) -> Result<Map<String, Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading inputs file {}", path.display()))?;
    parse_inputs(&content).with_context(|| format!("parsing inputs file {}", path.display()))
}

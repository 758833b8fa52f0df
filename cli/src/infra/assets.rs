//! Embedded assets compiled into the binary from `cli/assets/`.

use anyhow::Result;
use include_dir::{Dir, include_dir};

static EMBEDDED_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");

/// File name of the bundled agent config template.
pub const DEFAULT_TEMPLATE: &str = "filebeat.yml.tera";

/// Return a single embedded asset as UTF-8 text.
///
/// # Errors
///
/// Returns an error if no asset with the given `name` exists or it is not
/// valid UTF-8.
pub fn get_asset_text(name: &str) -> Result<&'static str> {
    EMBEDDED_ASSETS
        .get_file(name)
        .and_then(|f| f.contents_utf8())
        .ok_or_else(|| anyhow::anyhow!("embedded asset not found: {name}"))
}

/// The bundled config template.
///
/// # Errors
///
/// Returns an error if the binary was built without it.
pub fn default_template() -> Result<&'static str> {
    get_asset_text(DEFAULT_TEMPLATE)
}

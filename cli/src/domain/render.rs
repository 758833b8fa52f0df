//! Template rendering for the agent configuration file.
//!
//! Templates use Tera (Jinja-style) syntax. Autoescaping is off since the
//! output is YAML, not HTML. A variable referenced by the template but
//! missing from the inputs is an error, never an empty string.

use std::error::Error as _;

use serde_json::{Map, Value};
use tera::{Context, Tera};

use crate::domain::error::InstallerError;

/// Render `template` with `inputs` as the top-level variables.
///
/// # Errors
///
/// Returns `TemplateRenderError` for a malformed template or a placeholder
/// that has no value in `inputs`.
pub fn render_template(template: &str, inputs: &Map<String, Value>) -> Result<String, InstallerError> {
    let context = Context::from_value(Value::Object(inputs.clone()))
        .map_err(|e| InstallerError::TemplateRenderError(error_chain(&e)))?;
    Tera::one_off(template, &context, false)
        .map_err(|e| InstallerError::TemplateRenderError(error_chain(&e)))
}

/// Parse config inputs from YAML (JSON is accepted as a YAML subset).
///
/// An empty document yields an empty mapping.
///
/// # Errors
///
/// Returns `TemplateRenderError` when the document does not parse or its
/// top level is not a mapping.
pub fn parse_inputs(content: &str) -> Result<Map<String, Value>, InstallerError> {
    if content.trim().is_empty() {
        return Ok(Map::new());
    }
    let value: Value = serde_yaml::from_str(content).map_err(|e| {
        InstallerError::TemplateRenderError(format!("config inputs are not valid YAML: {e}"))
    })?;
    match value {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        other => Err(InstallerError::TemplateRenderError(format!(
            "config inputs must be a mapping of names to values, got {}",
            kind_name(&other)
        ))),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

// Tera nests the useful message ("Variable `x` not found ...") in `source()`.
fn error_chain(err: &tera::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}

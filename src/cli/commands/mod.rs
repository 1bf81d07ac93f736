//! Command implementations.

pub mod branch;
pub mod completions;
pub mod env;
pub mod flows;
pub mod git;
pub mod pr;
pub mod projects;
pub mod pull;
pub mod push;
pub mod remote;
pub mod settings;
pub mod status;
pub mod version;

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Parse a `--data`/`--file` argument that must hold a JSON object.
fn json_object(text: &str, source: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Error::InvalidArgument(format!(
            "{source} must be a JSON object"
        ))),
        Err(e) => Err(Error::InvalidArgument(format!("invalid JSON in {source}: {e}"))),
    }
}

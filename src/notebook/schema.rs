use jsonschema::JSONSchema;
use log::info;
use serde_json::Value;

use crate::error::NotebookError;

/// Compile the bundled notebook schema
///
/// Only the parts of nbformat this tool relies on are checked: a `cells` array where every cell
/// has a `cell_type` and a `source` (string or list of strings).
pub fn load_schema() -> Result<JSONSchema, NotebookError> {
    /// included notebook schema
    static SCHEMA: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/schema/notebook.json"));
    info!("Compiling notebook schema");
    let json: Value = serde_json::from_str(SCHEMA)
        .map_err(|err| NotebookError::Schema(err.to_string()))?;
    JSONSchema::compile(&json)
        .map_err(|err| NotebookError::Schema(err.to_string()))
}

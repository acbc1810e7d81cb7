use std::fs;
use std::path::Path;

use jsonschema::JSONSchema;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::NotebookError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Code,
    Raw,
    Other,
}

/// Cell source: nbformat allows a list of lines or a single string
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Source {
    Lines(Vec<String>),
    Text(String),
}

impl Source {
    pub fn text(&self) -> String {
        match self {
            Source::Lines(lines) => lines.concat(),
            Source::Text(text) => text.clone(),
        }
    }
}

/// A notebook cell
///
/// Only `cell_type` and `source` are interpreted. Everything else (metadata, outputs, attachments,
/// ids) is carried through untouched.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Cell {
    pub cell_type: String,
    pub source: Source,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Cell {
    /// A fresh code cell holding only `source`, with empty metadata and no outputs
    pub fn spike_in(source: Source) -> Cell {
        let mut fields = Map::new();
        fields.insert("metadata".to_string(), json!({}));
        fields.insert("outputs".to_string(), json!([]));
        fields.insert("execution_count".to_string(), Value::Null);
        Cell { cell_type: "code".to_string(), source, fields }
    }

    pub fn kind(&self) -> CellKind {
        match self.cell_type.as_str() {
            "code" => CellKind::Code,
            "raw" => CellKind::Raw,
            _ => CellKind::Other,
        }
    }
}

/// A notebook document: ordered cells plus document level fields (metadata, nbformat, ...)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Notebook {
    /// Read a notebook from disk, validating it against the notebook schema first
    pub fn read(path: &Path, schema: &JSONSchema) -> Result<Notebook, NotebookError> {
        let json: Value = parse_untyped_json(path)?;

        match validate(path, &json, schema) {
            Ok(_) => {
                info!("Notebook {} is valid", path.display());
                parse_json(path, json)
            }
            Err(err) => {
                warn!("Notebook {} fails validation", path.display());
                Err(err)
            }
        }
    }

    /// Serialise to compact JSON, replacing any existing file at `path`
    ///
    /// Field order is fixed (struct fields first, then remaining keys sorted), so writing the same
    /// document twice gives byte-identical files.
    pub fn write(&self, path: &Path) -> Result<(), NotebookError> {
        let content = serde_json::to_vec(self).map_err(|err| NotebookError::Write {
            path: path.to_path_buf(),
            source: err.into(),
        })?;
        fs::write(path, content).map_err(|source| NotebookError::Write { path: path.to_path_buf(), source })
    }

    pub fn prepend(&mut self, cell: Cell) {
        self.cells.insert(0, cell);
    }
}

fn read_file(path: &Path) -> Result<String, NotebookError> {
    info!("Reading notebook at {}", path.display());
    fs::read_to_string(path).map_err(|source| {
        warn!("Can't read notebook at path {}: {}", path.display(), source);
        NotebookError::Read { path: path.to_path_buf(), source }
    })
}

fn parse_untyped_json(path: &Path) -> Result<Value, NotebookError> {
    let json_string = read_file(path)?;
    // from_str is generic, so request Value (generic json) specifically
    serde_json::from_str::<Value>(&json_string)
        .map_err(|source| NotebookError::Decode { path: path.to_path_buf(), source })
}

fn validate(path: &Path, json: &Value, schema: &JSONSchema) -> Result<(), NotebookError> {
    schema.validate(json).map_err(|errors| {
        let reason = errors.map(|err| err.to_string()).collect::<Vec<String>>().join("; ");
        NotebookError::Validation { path: path.to_path_buf(), reason }
    })
}

fn parse_json(path: &Path, value: Value) -> Result<Notebook, NotebookError> {
    serde_json::from_value::<Notebook>(value)
        .map_err(|source| NotebookError::Decode { path: path.to_path_buf(), source })
}

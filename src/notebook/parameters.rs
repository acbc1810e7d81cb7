use std::path::Path;

use jsonschema::JSONSchema;
use log::{info, warn};

use crate::error::NotebookError;
use crate::notebook::document::{Cell, CellKind, Notebook};

/// Spike-in cells and their suffixes, read from a parameter notebook
///
/// Every code cell becomes a spike-in cell. Raw cells name the spike-in cells: each raw cell must
/// hold exactly one word, and the words are matched to code cells in document order. If the
/// number of names doesn't match the number of code cells the names are dropped and the cells are
/// numbered from 0 instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub spike_ins: Vec<Cell>,
    pub suffixes: Vec<String>,
}

impl Parameters {
    pub fn read(path: &Path, schema: &JSONSchema) -> Result<Parameters, NotebookError> {
        info!("Reading parameter notebook {}", path.display());
        let notebook = Notebook::read(path, schema)?;
        let parameters = Parameters::from_notebook(&notebook)?;
        match parameters.is_empty() {
            true => Err(NotebookError::NoParameterCells(path.to_path_buf())),
            false => Ok(parameters),
        }
    }

    pub fn from_notebook(notebook: &Notebook) -> Result<Parameters, NotebookError> {
        let mut spike_ins: Vec<Cell> = Vec::new();
        let mut suffixes: Vec<String> = Vec::new();

        for (index, cell) in notebook.cells.iter().enumerate() {
            match cell.kind() {
                CellKind::Code => spike_ins.push(Cell::spike_in(cell.source.clone())),
                CellKind::Raw => suffixes.push(suffix_name(index, cell)?),
                CellKind::Other => {}
            }
        }

        if suffixes.len() != spike_ins.len() {
            if !suffixes.is_empty() {
                warn!("Found {} names for {} parameter cells, numbering cells instead", suffixes.len(), spike_ins.len());
            }
            suffixes = (0..spike_ins.len()).map(|i| i.to_string()).collect();
        }

        info!("Found {} parameter cells: {}", spike_ins.len(), suffixes.join(", "));
        Ok(Parameters { spike_ins, suffixes })
    }

    /// Spike-in cells paired with their suffixes, in document order
    pub fn pairs(&self) -> impl Iterator<Item = (&Cell, &str)> {
        self.spike_ins.iter().zip(self.suffixes.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.spike_ins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spike_ins.is_empty()
    }
}

fn suffix_name(index: usize, cell: &Cell) -> Result<String, NotebookError> {
    let text = cell.source.text();
    let tokens: Vec<&str> = text.split_whitespace().collect();
    match tokens.as_slice() {
        [name] => Ok(name.to_string()),
        _ => Err(NotebookError::MalformedSuffixCell { index, tokens: tokens.len() }),
    }
}

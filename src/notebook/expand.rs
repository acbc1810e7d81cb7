use std::fs;
use std::path::{Path, PathBuf};

use jsonschema::JSONSchema;
use log::{info, warn};

use crate::error::NotebookError;
use crate::notebook::document::{Cell, Notebook};
use crate::notebook::parameters::Parameters;

/// Write a copy of every notebook for every spike-in cell
///
/// Returned paths are ordered by spike-in cell first, then by notebook. Existing files are
/// overwritten, so running twice with the same inputs produces the same files.
pub fn expand(notebooks: &[PathBuf], parameters: &Parameters, schema: &JSONSchema) -> Result<Vec<PathBuf>, NotebookError> {
    // fail on a bad notebook path before anything is written
    for notebook in notebooks {
        expanded_path(notebook, "")?;
    }

    let mut expanded: Vec<PathBuf> = Vec::with_capacity(notebooks.len() * parameters.len());
    for (spike_in, suffix) in parameters.pairs() {
        for notebook in notebooks {
            expanded.push(expand_notebook(notebook, spike_in, suffix, schema)?);
        }
    }

    info!("Wrote {} expanded notebooks", expanded.len());
    Ok(expanded)
}

/// Path of the expanded notebook: `foo/bar.ipynb` with suffix `x` is `foo/bar/bar_x.ipynb`
pub fn expanded_path(notebook: &Path, suffix: &str) -> Result<PathBuf, NotebookError> {
    let (stem, extension) = match (notebook.file_stem(), notebook.extension()) {
        (Some(stem), Some(extension)) => (stem, extension),
        _ => return Err(NotebookError::MissingExtension(notebook.to_path_buf())),
    };

    let mut name = stem.to_os_string();
    name.push("_");
    name.push(suffix);
    name.push(".");
    name.push(extension);

    Ok(notebook.with_extension("").join(name))
}

fn expand_notebook(notebook: &Path, spike_in: &Cell, suffix: &str, schema: &JSONSchema) -> Result<PathBuf, NotebookError> {
    let mut document = Notebook::read(notebook, schema)?;
    document.prepend(spike_in.clone());

    let out_path = expanded_path(notebook, suffix)?;
    let out_dir = notebook.with_extension("");
    fs::create_dir_all(&out_dir).map_err(|source| NotebookError::Write { path: out_dir.clone(), source })?;

    if out_path.exists() {
        warn!("Expanded notebook {} already exists, overwriting", out_path.display());
    }
    info!("Writing expanded notebook {}", out_path.display());
    document.write(&out_path)?;

    Ok(out_path)
}

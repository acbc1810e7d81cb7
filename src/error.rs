use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MemoryError {
    #[error("memory unit must be one of k, m or g, got {0:?}")]
    InvalidUnit(String),

    #[error("can't parse memory quantity {0:?}")]
    InvalidNumber(String),
}

/// Problems with the command line options, detected before anything is written to disk
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("multiprocessing across multiple nodes not supported yet (requested {0} nodes)")]
    MultiNode(u32),

    #[error("only use --inplace with --format notebook")]
    InplaceFormat,

    #[error("do not use --parameters with --inplace")]
    InplaceWithParameters,

    #[error("--cleanup requires --parameters")]
    CleanupWithoutParameters,

    #[error("--cleanup can't be used with --format notebook")]
    CleanupWithNotebookFormat,

    #[error("no notebooks to run")]
    NoNotebooks,

    #[error(transparent)]
    Memory(#[from] MemoryError),
}

#[derive(Debug, Error)]
pub enum NotebookError {
    #[error("can't read notebook {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("can't write notebook {}: {source}", .path.display())]
    Write { path: PathBuf, source: std::io::Error },

    #[error("notebook {} is not valid JSON: {source}", .path.display())]
    Decode { path: PathBuf, source: serde_json::Error },

    #[error("notebook {} fails validation: {reason}", .path.display())]
    Validation { path: PathBuf, reason: String },

    #[error("bundled notebook schema is invalid: {0}")]
    Schema(String),

    #[error("raw cell {index} must contain exactly one name, found {tokens}")]
    MalformedSuffixCell { index: usize, tokens: usize },

    #[error("parameter notebook {} has no code cells", .0.display())]
    NoParameterCells(PathBuf),

    #[error("notebook {} has no file extension", .0.display())]
    MissingExtension(PathBuf),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("can't write job script {}: {source}", .path.display())]
    WriteScript { path: PathBuf, source: std::io::Error },

    #[error("can't run {program}: {source}")]
    Spawn { program: String, source: std::io::Error },

    #[error("Slurm job submission failed\nstdout:\n{stdout}\nstderr:\n{stderr}")]
    SubmissionFailed { stdout: String, stderr: String },
}

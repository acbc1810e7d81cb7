//! Read, validate and expand Jupyter notebooks
//!
//! A parameter notebook supplies "spike-in" code cells. Each spike-in cell is prepended to a copy
//! of every target notebook, and the copies are written next to the original so that each one can
//! be executed by its own nbconvert command.

/// Typed notebook documents, read from and written to disk
pub mod document;
/// Bundled JSON schema used to validate notebooks before deserialising
pub mod schema;
/// Extract spike-in cells and suffixes from a parameter notebook
pub mod parameters;
/// Write one expanded notebook per spike-in cell and target notebook
pub mod expand;

use std::fmt;
use clap::ValueEnum;

/// nbconvert output formats
///
/// `Notebook` writes an executed notebook, the other formats convert it to a report.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    Notebook,
    Html,
    Pdf
}

impl fmt::Display for OutputFormat {
      fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OutputFormat::Notebook => write!(f, "notebook"),
            OutputFormat::Html => write!(f, "html"),
            OutputFormat::Pdf => write!(f, "pdf")
        }
    }
}

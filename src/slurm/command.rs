use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;
use tinytemplate::TinyTemplate;

use crate::format::OutputFormat;

/// Options passed to `jupyter nbconvert` for every notebook in the job
#[derive(Debug, Clone, PartialEq)]
pub struct NbConvert {
    pub format: OutputFormat,
    pub timeout: i64,
    pub allow_errors: bool,
    pub inplace: bool,
    /// delete each notebook once it has been converted (ignored for `--to notebook`)
    pub cleanup: bool,
}

/// Rendering context for one nbconvert command
#[derive(Serialize)]
struct NbConvertContext {
    format: String,
    inplace: String,
    timeout: i64,
    allow_errors: String,
    notebook: String,
}

impl NbConvert {
    /// One command per notebook, in the same order
    pub fn commands(&self, notebooks: &[PathBuf]) -> Result<Vec<String>, tinytemplate::error::Error> {
        /// included nbconvert command template
        static NBCONVERT: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/nbconvert.txt"));
        let mut tt = TinyTemplate::new();
        tt.set_default_formatter(&tinytemplate::format_unescaped);
        tt.add_template("nbconvert", NBCONVERT)?;

        let mut commands: Vec<String> = Vec::with_capacity(notebooks.len());
        for notebook in notebooks {
            let command = self.command(&tt, notebook)?;
            info!("Command: {command}");
            commands.push(command);
        }
        Ok(commands)
    }

    fn command(&self, tt: &TinyTemplate, notebook: &Path) -> Result<String, tinytemplate::error::Error> {
        let notebook = shell_quote(&notebook.display().to_string());
        let context = NbConvertContext {
            format: self.format.to_string(),
            inplace: flag(self.inplace, "--inplace"),
            timeout: self.timeout,
            allow_errors: flag(self.allow_errors, "--allow-errors"),
            notebook: notebook.clone(),
        };
        let command = tt.render("nbconvert", &context)?;
        let command = command.trim_end();

        match self.cleanup && self.format != OutputFormat::Notebook {
            true => Ok(format!("{command} && rm {notebook}")),
            false => Ok(command.to_string()),
        }
    }
}

/// Quote a word for a POSIX shell, leaving plain paths as they are
pub fn shell_quote(s: &str) -> String {
    if s.is_empty() {
        "''".to_string()
    } else if s.chars().all(|c| c.is_ascii_alphanumeric() || "-_./:@+,".contains(c)) {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', "'\\''"))
    }
}

fn flag(set: bool, name: &str) -> String {
    match set {
        true => name.to_string(),
        false => String::new(),
    }
}

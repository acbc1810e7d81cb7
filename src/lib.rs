//! Execute Jupyter notebooks as SLURM batch jobs
//!
//! Options are validated into a typed job configuration, notebooks are optionally expanded with
//! parameter cells, and a job script running `jupyter nbconvert --execute` on each notebook is
//! rendered and submitted with sbatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, info, warn};

use crate::cli::Args;
use crate::notebook::expand::expand;
use crate::notebook::parameters::Parameters;
use crate::notebook::schema::load_schema;
use crate::slurm::submit::JobId;

/// Command line options
pub mod cli;
pub mod error;
pub mod format;
/// Memory quantities
pub mod memory;
pub mod notebook;
pub mod queue;
pub mod slurm;

/// A directory where job scripts and SLURM logs are written
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingDirectory {
    pub path: PathBuf,
}

impl WorkingDirectory {
    /// `~/.slurm_jupyter_run`, or `./.slurm_jupyter_run` if there's no home directory
    pub fn default_tmp() -> WorkingDirectory {
        let base = home::home_dir().unwrap_or_else(|| PathBuf::from("."));
        WorkingDirectory { path: base.join(".slurm_jupyter_run") }
    }
}

/// Build and submit the job described by `args`
///
/// Returns the SLURM job id, or `None` for a dry run.
pub fn run(args: &Args) -> Result<Option<JobId>> {
    args.validate()?;
    let schema = load_schema()?;
    let nbconvert = args.nbconvert();

    let commands = match &args.parameters {
        Some(path) => {
            let parameters = Parameters::read(path, &schema)?;
            let expanded = expand(&args.notebooks, &parameters, &schema)?;
            nbconvert.commands(&expanded).context("Rendering nbconvert commands")?
        }
        None => nbconvert.commands(&args.notebooks).context("Rendering nbconvert commands")?,
    };

    let cwd = std::env::current_dir().context("Reading current directory")?;
    let config = args.job_config(cwd, commands)?;

    match config.expected_end(Utc::now()) {
        Some(end) => info!("Job {} will be killed at {} at the latest", config.job_name, end),
        None => warn!("Can't parse wall time {}, passing it to sbatch as is", config.walltime),
    }

    let script = config.render().context("Rendering job script")?;
    debug!("slurm script:\n{}", script.content);

    if args.dry_run {
        info!("--dry-run set, not submitting job");
        println!("{}", script.content);
        return Ok(None);
    }

    let job_id = args.scheduler().submit(&script, &config.tmp)?;
    Ok(Some(job_id))
}

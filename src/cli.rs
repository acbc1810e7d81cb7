use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;

use crate::error::ConfigError;
use crate::format::OutputFormat;
use crate::memory::MemorySpec;
use crate::queue::Queue;
use crate::slurm::command::NbConvert;
use crate::slurm::config::JobConfig;
use crate::slurm::submit::Scheduler;
use crate::WorkingDirectory;

/// Execute notebooks on a SLURM cluster
///
/// Each notebook is run with `jupyter nbconvert --execute` inside a batch job. With --parameters,
/// every code cell of the parameter notebook is prepended to a copy of each notebook and the
/// copies are run instead.
#[derive(Parser, Debug, Clone)]
#[command(author, version)]
pub struct Args {
    /// Account/project to run under, usually the name of the shared folder you work in
    #[arg(short = 'A', long)]
    pub account: Option<String>,

    /// Cluster queue to submit to
    #[arg(short, long, value_enum, default_value_t = Queue::Normal)]
    pub queue: Queue,

    /// Number of cores, for multiprocessing or running notebooks in parallel
    #[arg(short, long, default_value_t = 1)]
    pub cores: u32,

    /// Number of nodes (machines) to allocate, only 1 is supported
    #[arg(short, long, default_value_t = 1)]
    pub nodes: u32,

    /// Start an ipcluster with one engine per core
    #[arg(long)]
    pub ipcluster: bool,

    /// Max wall time as HH:MM:SS (or any other format sbatch accepts)
    #[arg(short, long, default_value = "08:00:00")]
    pub time: String,

    /// Name of job [default: jptr_<user>_<unix time>]
    #[arg(short = 'N', long)]
    pub name: Option<String>,

    /// Conda environment to run jupyter in
    #[arg(short, long)]
    pub environment: Option<String>,

    /// Print debugging information, including the job script
    #[arg(short, long)]
    pub verbose: bool,

    /// Max memory for each core, e.g. 4g or 500m
    #[arg(long, conflicts_with = "total_memory")]
    pub memory_per_cpu: Option<String>,

    /// Max memory total for all cores, e.g. 4g or 500m [default: 8g]
    #[arg(short = 'm', long)]
    pub total_memory: Option<String>,

    /// Cell execution timeout in seconds, -1 for no timeout
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub timeout: i64,

    /// Allow errors in cell executions
    #[arg(long)]
    pub allow_errors: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    pub format: OutputFormat,

    /// Overwrite the notebook with the executed version (requires --format notebook)
    #[arg(long)]
    pub inplace: bool,

    /// Notebook whose code cells are each prepended to a copy of every notebook
    #[arg(short, long)]
    pub parameters: Option<PathBuf>,

    /// Delete expanded notebooks once they are converted (requires --parameters)
    #[arg(long)]
    pub cleanup: bool,

    /// Directory for job scripts and SLURM logs [default: ~/.slurm_jupyter_run]
    #[arg(long)]
    pub tmp_dir: Option<PathBuf>,

    /// sbatch program used to submit jobs
    #[arg(long, default_value = "sbatch")]
    pub sbatch: String,

    /// Shell command run before sbatch, e.g. "source /com/extra/slurm/14.03.0/load.sh"
    #[arg(long)]
    pub slurm_setup: Option<String>,

    /// Print the job script instead of submitting it
    #[arg(long)]
    pub dry_run: bool,

    /// Notebooks to execute
    pub notebooks: Vec<PathBuf>,
}

impl Args {
    /// Check option combinations before anything is written to disk
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nodes != 1 {
            return Err(ConfigError::MultiNode(self.nodes));
        }
        if self.inplace && self.format != OutputFormat::Notebook {
            return Err(ConfigError::InplaceFormat);
        }
        if self.inplace && self.parameters.is_some() {
            return Err(ConfigError::InplaceWithParameters);
        }
        if self.cleanup && self.parameters.is_none() {
            return Err(ConfigError::CleanupWithoutParameters);
        }
        if self.cleanup && self.format == OutputFormat::Notebook {
            return Err(ConfigError::CleanupWithNotebookFormat);
        }
        if self.notebooks.is_empty() {
            return Err(ConfigError::NoNotebooks);
        }
        self.memory()?;
        Ok(())
    }

    pub fn memory(&self) -> Result<MemorySpec, ConfigError> {
        Ok(MemorySpec::from_options(self.memory_per_cpu.as_deref(), self.total_memory.as_deref())?)
    }

    pub fn nbconvert(&self) -> NbConvert {
        NbConvert {
            format: self.format,
            timeout: self.timeout,
            allow_errors: self.allow_errors,
            inplace: self.inplace,
            cleanup: self.cleanup,
        }
    }

    pub fn scheduler(&self) -> Scheduler {
        Scheduler { sbatch: self.sbatch.clone(), setup: self.slurm_setup.clone() }
    }

    pub fn working_directory(&self) -> WorkingDirectory {
        match &self.tmp_dir {
            Some(path) => WorkingDirectory { path: path.clone() },
            None => WorkingDirectory::default_tmp(),
        }
    }

    pub fn job_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("jptr_{}_{}", username(), Utc::now().timestamp()),
        }
    }

    pub fn job_config(&self, cwd: PathBuf, commands: Vec<String>) -> Result<JobConfig, ConfigError> {
        Ok(JobConfig {
            queue: self.queue,
            memory: self.memory()?,
            nodes: self.nodes,
            cores: self.cores,
            walltime: self.time.clone(),
            job_name: self.job_name(),
            account: self.account.clone(),
            environment: self.environment.clone().filter(|env| !env.is_empty()),
            ipcluster: self.ipcluster,
            cwd,
            tmp: self.working_directory(),
            commands,
        })
    }
}

fn username() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .unwrap_or_else(|_| "user".to_string())
}

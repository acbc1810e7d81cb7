use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::OnceLock;

use chrono::Utc;
use log::{debug, info, warn};
use regex::Regex;

use crate::error::SubmitError;
use crate::slurm::command::shell_quote;
use crate::slurm::job::{JobScript, TMP_NAME};
use crate::WorkingDirectory;

/// SLURM job id, as reported by sbatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How job scripts are handed to SLURM
#[derive(Debug, Clone, PartialEq)]
pub struct Scheduler {
    /// sbatch program, looked up on PATH unless it's a path
    pub sbatch: String,
    /// shell command run before sbatch in the same shell, e.g. sourcing a site `load.sh`
    pub setup: Option<String>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Scheduler { sbatch: "sbatch".to_string(), setup: None }
    }
}

impl Scheduler {
    /// Write the job script to the working directory and submit it
    ///
    /// Blocks until sbatch exits. The script is left on disk whether or not submission worked.
    pub fn submit(&self, script: &JobScript, wd: &WorkingDirectory) -> Result<JobId, SubmitError> {
        let script_path = write_script(script, wd)?;
        let output = self.run_sbatch(&script_path)?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        match (output.status.success(), parse_job_id(&stdout)) {
            (true, Some(job_id)) => {
                info!("SLURM job id: {job_id}");
                Ok(job_id)
            }
            _ => {
                warn!("Slurm job submission failed, sbatch {}", output.status);
                Err(SubmitError::SubmissionFailed { stdout, stderr })
            }
        }
    }

    fn command(&self, script_path: &Path) -> Command {
        match &self.setup {
            Some(setup) => {
                let mut sh = Command::new("sh");
                sh.arg("-c").arg(format!(
                    "{} && {} {}",
                    setup,
                    shell_quote(&self.sbatch),
                    shell_quote(&script_path.display().to_string())
                ));
                sh
            }
            None => {
                let mut sbatch = Command::new(&self.sbatch);
                sbatch.arg(script_path);
                sbatch
            }
        }
    }

    fn run_sbatch(&self, script_path: &Path) -> Result<Output, SubmitError> {
        let mut cmd = self.command(script_path);
        info!("Running sbatch process");
        debug!("{:?}", &cmd);
        cmd.output().map_err(|source| SubmitError::Spawn { program: self.sbatch.clone(), source })
    }
}

/// Find the job id in sbatch output (`Submitted batch job 1234`)
pub fn parse_job_id(stdout: &str) -> Option<JobId> {
    static SUBMITTED: OnceLock<Regex> = OnceLock::new();
    let re = SUBMITTED.get_or_init(|| Regex::new(r"Submitted batch job (\d+)").expect("Valid job id pattern"));
    re.captures(stdout)
        .and_then(|captures| captures.get(1))
        .map(|id| JobId(id.as_str().to_string()))
}

/// Write the script to `<wd>/slurm_jupyter_run_<unix seconds>.sh`, creating the directory if needed
fn write_script(script: &JobScript, wd: &WorkingDirectory) -> Result<PathBuf, SubmitError> {
    let path = wd.path.join(format!("{}_{}.sh", TMP_NAME, Utc::now().timestamp()));
    fs::create_dir_all(&wd.path).map_err(|source| SubmitError::WriteScript { path: wd.path.clone(), source })?;

    if path.exists() {
        warn!("Job script {} already exists, overwriting", path.display());
    }
    info!("Writing job script to {}", path.display());
    fs::write(&path, &script.content).map_err(|source| SubmitError::WriteScript { path: path.clone(), source })?;

    Ok(path)
}

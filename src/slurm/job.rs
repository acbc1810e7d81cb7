use log::info;
use serde::Serialize;
use tinytemplate::TinyTemplate;

use crate::slurm::command::shell_quote;
use crate::slurm::config::JobConfig;

/// Log files are named `<tmp>/slurm_jupyter_run.<job id>.{out,err}`
pub static TMP_NAME: &str = "slurm_jupyter_run";

/// A complete job script, ready to be written to disk and submitted with sbatch
#[derive(Debug, Clone, PartialEq)]
pub struct JobScript {
    pub content: String,
}

impl JobConfig {
    /// Render the job script by concatenating rendered template sections
    pub fn render(&self) -> Result<JobScript, tinytemplate::error::Error> {
        info!("Rendering job script for {}", &self.job_name);
        let header: Header = render_header(self)?;
        let conda: CondaInit = read_conda_init();
        let workflow: Workflow = render_workflow(self)?;
        let job = JobTemplate { header, conda, workflow };
        Ok(job.script())
    }
}

/// All rendered sections of a job script
struct JobTemplate {
    header: Header,
    conda: CondaInit,
    workflow: Workflow,
}

impl JobTemplate {
    fn script(self) -> JobScript {
        // order is important when writing the file
        let contents = [
            self.header.content,
            self.conda.content,
            self.workflow.content,
        ];
        JobScript { content: contents.concat() }
    }
}

/// Rendered SBATCH header
///
/// SLURM job options are parsed by sbatch from `#SBATCH` lines [before executable commands](https://slurm.schedmd.com/sbatch.html#SECTION_DESCRIPTION):
/// - partition (queue)
/// - memory, either per core or in total
/// - tasks and cores
/// - wall time
/// - log files
/// - job name
/// - account for billing usage, if set
struct Header {
    content: String,
}

/// Static conda initialisation, so `source activate` works in a non-interactive shell
struct CondaInit {
    content: String,
}

/// Rendered workflow commands
///
/// Activates the conda environment, optionally starts an ipcluster in the background, then runs
/// the nbconvert commands one after another.
struct Workflow {
    content: String,
}

/// Rendering context for header
#[derive(Serialize)]
struct HeaderContext {
    queue: String,
    memory_spec: String,
    nodes: u32,
    cores: u32,
    walltime: String,
    log_prefix: String,
    job_name: String,
    account_spec: String,
    cwd: String,
}

/// Rendering context for workflow
#[derive(Serialize)]
struct WorkflowContext {
    environment: String,
    ipcluster: String,
    commands: String,
}

/// Shell templates must not be HTML escaped
fn template<'a>(name: &'a str, text: &'a str) -> Result<TinyTemplate<'a>, tinytemplate::error::Error> {
    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template(name, text)?;
    Ok(tt)
}

/// Render the SBATCH header using TinyTemplate
fn render_header(config: &JobConfig) -> Result<Header, tinytemplate::error::Error> {
    /// included header template
    static HEADER: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/header.txt"));
    let tt = template("header", HEADER)?;

    let context = HeaderContext {
        queue: config.queue.to_string(),
        memory_spec: config.memory.header_line(),
        nodes: config.nodes,
        cores: config.cores,
        walltime: config.walltime.clone(),
        log_prefix: config.tmp.path.join(TMP_NAME).display().to_string(),
        job_name: config.job_name.clone(),
        account_spec: match &config.account {
            Some(account) => format!("#SBATCH -A {account}"),
            None => String::new(),
        },
        cwd: shell_quote(&config.cwd.display().to_string()),
    };

    Ok(Header { content: tt.render("header", &context)? })
}

/// Read conda initialisation from template
fn read_conda_init() -> CondaInit {
    /// included conda init block, everything is static
    static CONDA: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/conda.txt"));
    CondaInit { content: CONDA.to_string() }
}

/// Render the workflow commands using TinyTemplate
fn render_workflow(config: &JobConfig) -> Result<Workflow, tinytemplate::error::Error> {
    /// included workflow template
    static WORKFLOW: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/workflow.txt"));
    let tt = template("workflow", WORKFLOW)?;

    let context = WorkflowContext {
        environment: match &config.environment {
            Some(env) => format!("source activate {}", shell_quote(env)),
            None => String::new(),
        },
        ipcluster: match config.ipcluster {
            true => format!("ipcluster start -n {} &", config.cores),
            false => String::new(),
        },
        commands: config.commands.join("\n"),
    };

    Ok(Workflow { content: tt.render("workflow", &context)? })
}

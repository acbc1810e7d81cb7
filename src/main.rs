use clap::Parser;
use env_logger::Env;
use log::info;

use slurm_jupyter_run::cli::Args;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        true => "debug",
        false => "info",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();
    info!("Starting slurm-jupyter-run {}", env!("CARGO_PKG_VERSION"));

    if let Some(job_id) = slurm_jupyter_run::run(&args)? {
        println!("Submitted slurm with job id: {job_id}");
    }

    Ok(())
}

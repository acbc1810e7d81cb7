//! Build, render and submit SLURM job scripts

/// Typed job configuration
pub mod config;
/// nbconvert command lines run by the job
pub mod command;
/// Render the job script from static templates
pub mod job;
/// Write the job script and submit it with sbatch
pub mod submit;

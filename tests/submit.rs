#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde_json::json;
use tempfile::TempDir;

use slurm_jupyter_run::cli::Args;
use slurm_jupyter_run::error::SubmitError;
use slurm_jupyter_run::error::NotebookError;
use slurm_jupyter_run::run;
use slurm_jupyter_run::slurm::command::shell_quote;
use slurm_jupyter_run::slurm::submit::JobId;

/// Stand-in for sbatch that records the script it was given
fn fake_sbatch(dir: &Path, output: &str, exit_code: i32) -> PathBuf {
    let path = dir.join("sbatch");
    let script = format!(
        "#!/bin/sh\necho \"$1\" >> \"{}\"\necho '{}'\nexit {}\n",
        dir.join("submitted.txt").display(),
        output,
        exit_code
    );
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn write_notebook(path: &Path) {
    let nb = json!({
        "cells": [{"cell_type": "code", "execution_count": null, "metadata": {}, "outputs": [], "source": ["print(n)"]}],
        "metadata": {"kernelspec": {"name": "python3", "display_name": "Python 3"}},
        "nbformat": 4,
        "nbformat_minor": 4
    });
    fs::write(path, nb.to_string()).unwrap();
}

fn write_parameters(path: &Path) {
    let nb = json!({
        "cells": [
            {"cell_type": "code", "execution_count": 1, "metadata": {}, "outputs": [], "source": ["n = 10"]},
            {"cell_type": "code", "execution_count": 2, "metadata": {}, "outputs": [], "source": ["n = 100"]},
            {"cell_type": "code", "execution_count": 3, "metadata": {}, "outputs": [], "source": ["n = 1000"]},
            {"cell_type": "raw", "metadata": {}, "source": ["small"]},
            {"cell_type": "raw", "metadata": {}, "source": ["medium"]},
            {"cell_type": "raw", "metadata": {}, "source": ["large\n"]}
        ],
        "metadata": {},
        "nbformat": 4,
        "nbformat_minor": 4
    });
    fs::write(path, nb.to_string()).unwrap();
}

fn args(dir: &Path, sbatch: &Path, extra: &[&str]) -> Args {
    let tmp = dir.join("tmp");
    let mut argv: Vec<String> = vec![
        "slurm-jupyter-run".to_string(),
        "--tmp-dir".to_string(),
        tmp.display().to_string(),
        "--sbatch".to_string(),
        sbatch.display().to_string(),
    ];
    argv.extend(extra.iter().map(|s| s.to_string()));
    Args::try_parse_from(argv).unwrap()
}

fn submitted_scripts(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("submitted.txt"))
        .unwrap_or_default()
        .lines()
        .map(|line| fs::read_to_string(line).unwrap())
        .collect()
}

fn nbconvert_lines(script: &str) -> Vec<&str> {
    script.lines().filter(|line| line.starts_with("jupyter nbconvert")).collect()
}

#[test]
fn submits_plain_notebook() {
    let dir = TempDir::new().unwrap();
    let sbatch = fake_sbatch(dir.path(), "Submitted batch job 4242", 0);
    let notebook = dir.path().join("analysis.ipynb");
    write_notebook(&notebook);

    let args = args(dir.path(), &sbatch, &[notebook.to_str().unwrap()]);
    let job_id = run(&args).unwrap();
    assert_eq!(job_id, Some(JobId("4242".to_string())));

    let scripts = submitted_scripts(dir.path());
    assert_eq!(scripts.len(), 1);
    let commands = nbconvert_lines(&scripts[0]);
    assert_eq!(commands.len(), 1);
    assert!(commands[0].ends_with(&format!("--execute {}", shell_quote(&notebook.display().to_string()))));
    assert!(scripts[0].contains("#SBATCH --mem 8192"));
}

#[test]
fn submits_one_command_per_expanded_notebook() {
    let dir = TempDir::new().unwrap();
    let sbatch = fake_sbatch(dir.path(), "Submitted batch job 7", 0);
    let first = dir.path().join("first.ipynb");
    let second = dir.path().join("second.ipynb");
    let params = dir.path().join("params.ipynb");
    write_notebook(&first);
    write_notebook(&second);
    write_parameters(&params);

    let args = args(dir.path(), &sbatch, &[
        "--cleanup",
        "-p", params.to_str().unwrap(),
        first.to_str().unwrap(),
        second.to_str().unwrap(),
    ]);
    assert_eq!(run(&args).unwrap(), Some(JobId("7".to_string())));

    let expected: Vec<PathBuf> = ["small", "medium", "large"]
        .iter()
        .flat_map(|suffix| {
            vec![
                dir.path().join("first").join(format!("first_{suffix}.ipynb")),
                dir.path().join("second").join(format!("second_{suffix}.ipynb")),
            ]
        })
        .collect();
    for path in &expected {
        assert!(path.exists(), "{} was not written", path.display());
    }

    let scripts = submitted_scripts(dir.path());
    assert_eq!(scripts.len(), 1);
    let commands = nbconvert_lines(&scripts[0]);
    assert_eq!(commands.len(), 6);
    for (command, path) in commands.iter().zip(&expected) {
        let quoted = shell_quote(&path.display().to_string());
        assert!(command.contains(&format!("--execute {quoted}")));
        assert!(command.ends_with(&format!("&& rm {quoted}")));
    }
}

#[test]
fn failed_submission_reports_output() {
    let dir = TempDir::new().unwrap();
    let sbatch = fake_sbatch(dir.path(), "sbatch: error: invalid partition", 1);
    let notebook = dir.path().join("analysis.ipynb");
    write_notebook(&notebook);

    let args = args(dir.path(), &sbatch, &[notebook.to_str().unwrap()]);
    let err = run(&args).unwrap_err();
    match err.downcast_ref::<SubmitError>() {
        Some(SubmitError::SubmissionFailed { stdout, .. }) => assert!(stdout.contains("invalid partition")),
        other => panic!("unexpected error {other:?}"),
    }

    // the job script is kept for inspection
    assert_eq!(submitted_scripts(dir.path()).len(), 1);
}

#[test]
fn dry_run_submits_nothing() {
    let dir = TempDir::new().unwrap();
    let sbatch = fake_sbatch(dir.path(), "Submitted batch job 1", 0);
    let notebook = dir.path().join("analysis.ipynb");
    write_notebook(&notebook);

    let args = args(dir.path(), &sbatch, &["--dry-run", notebook.to_str().unwrap()]);
    assert_eq!(run(&args).unwrap(), None);
    assert!(submitted_scripts(dir.path()).is_empty());
    assert!(!dir.path().join("tmp").exists());
}

#[test]
fn bad_options_have_no_side_effects() {
    let dir = TempDir::new().unwrap();
    let sbatch = fake_sbatch(dir.path(), "Submitted batch job 1", 0);
    let notebook = dir.path().join("analysis.ipynb");
    let params = dir.path().join("params.ipynb");
    write_notebook(&notebook);
    write_parameters(&params);

    let args = args(dir.path(), &sbatch, &["-n", "2", "-p", params.to_str().unwrap(), notebook.to_str().unwrap()]);
    assert!(run(&args).is_err());
    assert!(!dir.path().join("analysis").exists());
    assert!(submitted_scripts(dir.path()).is_empty());
}

#[test]
fn parameter_notebook_without_code_cells_is_rejected() {
    let dir = TempDir::new().unwrap();
    let sbatch = fake_sbatch(dir.path(), "Submitted batch job 9", 0);
    let notebook = dir.path().join("analysis.ipynb");
    let params = dir.path().join("params.ipynb");
    write_notebook(&notebook);
    let empty = json!({
        "cells": [{"cell_type": "markdown", "metadata": {}, "source": ["no parameters yet"]}],
        "metadata": {},
        "nbformat": 4,
        "nbformat_minor": 4
    });
    fs::write(&params, empty.to_string()).unwrap();

    let args = args(dir.path(), &sbatch, &["-p", params.to_str().unwrap(), notebook.to_str().unwrap()]);
    let err = run(&args).unwrap_err();
    assert!(matches!(err.downcast_ref::<NotebookError>(), Some(NotebookError::NoParameterCells(_))));
    assert!(submitted_scripts(dir.path()).is_empty());
}

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};

use crate::memory::MemorySpec;
use crate::queue::Queue;
use crate::WorkingDirectory;

/// Everything needed to render a job script
///
/// Built once from validated command line options and the final command list.
#[derive(Debug, Clone, PartialEq)]
pub struct JobConfig {
    pub queue: Queue,
    pub memory: MemorySpec,
    pub nodes: u32,
    pub cores: u32,
    /// passed to `#SBATCH -t` as is
    pub walltime: String,
    pub job_name: String,
    pub account: Option<String>,
    /// conda environment activated before running notebooks
    pub environment: Option<String>,
    pub ipcluster: bool,
    pub cwd: PathBuf,
    /// job scripts and SLURM logs are written here
    pub tmp: WorkingDirectory,
    pub commands: Vec<String>,
}

impl JobConfig {
    /// When the job will be killed if it starts `now`, if the wall time is `[D-]HH:MM:SS`
    pub fn expected_end(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let secs = walltime_seconds(&self.walltime)?;
        now.checked_add_signed(Duration::try_seconds(secs)?)
    }
}

/// Parse a `[D-]HH:MM:SS` wall time into seconds
///
/// SLURM accepts other formats too (`MM`, `D-HH`, ...), which are passed through to sbatch but
/// can't be parsed here. Values too large to represent are unparsed too.
pub fn walltime_seconds(walltime: &str) -> Option<i64> {
    let (days, clock) = match walltime.split_once('-') {
        Some((days, clock)) => (days.parse::<i64>().ok()?, clock),
        None => (0, walltime),
    };

    let parts: Vec<i64> = clock
        .split(':')
        .map(|part| part.parse::<i64>().ok())
        .collect::<Option<Vec<i64>>>()?;

    match parts.as_slice() {
        [hours, mins, secs] => days
            .checked_mul(86400)?
            .checked_add(hours.checked_mul(3600)?)?
            .checked_add(mins.checked_mul(60)?)?
            .checked_add(*secs),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn parses_walltime() {
        assert_eq!(walltime_seconds("08:00:00"), Some(8 * 3600));
        assert_eq!(walltime_seconds("2-01:30:15"), Some(2 * 86400 + 3600 + 30 * 60 + 15));
    }

    #[test]
    fn other_walltime_formats_are_unparsed() {
        assert_eq!(walltime_seconds("90"), None);
        assert_eq!(walltime_seconds("1-12"), None);
        assert_eq!(walltime_seconds("aa:bb:cc"), None);
    }

    #[test]
    fn huge_walltime_is_unparsed() {
        assert_eq!(walltime_seconds("9999999999999999:00:00"), None);
        assert_eq!(walltime_seconds("9999999999999999-00:00:00"), None);
    }

    fn config(walltime: &str) -> JobConfig {
        JobConfig {
            queue: Queue::Normal,
            memory: MemorySpec::Total(8192),
            nodes: 1,
            cores: 1,
            walltime: walltime.to_string(),
            job_name: "test".to_string(),
            account: None,
            environment: None,
            ipcluster: false,
            cwd: PathBuf::from("/home/user"),
            tmp: WorkingDirectory { path: PathBuf::from("/home/user/.slurm_jupyter_run") },
            commands: vec![],
        }
    }

    #[test]
    fn expected_end_adds_walltime() {
        let config = config("01:00:00");
        let now = Utc.with_ymd_and_hms(2023, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(config.expected_end(now), Some(Utc.with_ymd_and_hms(2023, 6, 1, 13, 0, 0).unwrap()));
    }

    #[test]
    fn expected_end_out_of_range_is_none() {
        let now = Utc.with_ymd_and_hms(2023, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(config("9999999999:00:00").expected_end(now), None);
    }
}

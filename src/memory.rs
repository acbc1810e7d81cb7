//! Human memory quantities (`4g`, `500m`, `512k`) as SLURM megabytes

use crate::error::MemoryError;

/// Convert a quantity with a k/m/g suffix (any case) to megabytes
pub fn str_to_mb(s: &str) -> Result<f64, MemoryError> {
    let s = s.trim();
    let (number, unit) = match s.char_indices().last() {
        Some((i, unit)) => (&s[..i], unit.to_ascii_lowercase()),
        None => return Err(MemoryError::InvalidUnit(String::new())),
    };

    let scale = match unit {
        'g' => 1024.0,
        'm' => 1.0,
        'k' => 1.0 / 1024.0,
        other => return Err(MemoryError::InvalidUnit(other.to_string())),
    };

    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| MemoryError::InvalidNumber(s.to_string()))?;

    Ok(value * scale)
}

/// Memory request written to the SBATCH header, always whole megabytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemorySpec {
    PerCpu(u64),
    Total(u64),
}

impl MemorySpec {
    /// Pick the per-core request if given, otherwise the total (default 8g)
    pub fn from_options(per_cpu: Option<&str>, total: Option<&str>) -> Result<MemorySpec, MemoryError> {
        match (per_cpu, total) {
            (Some(per_cpu), _) => Ok(MemorySpec::PerCpu(str_to_mb(per_cpu)? as u64)),
            (None, Some(total)) => Ok(MemorySpec::Total(str_to_mb(total)? as u64)),
            (None, None) => Ok(MemorySpec::Total(str_to_mb("8g")? as u64)),
        }
    }

    pub fn header_line(&self) -> String {
        match self {
            MemorySpec::PerCpu(mb) => format!("#SBATCH --mem-per-cpu {mb}"),
            MemorySpec::Total(mb) => format!("#SBATCH --mem {mb}"),
        }
    }
}

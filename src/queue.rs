use std::fmt;
use clap::ValueEnum;

/// SLURM partitions jobs can be submitted to
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Queue {
    Normal,
    Express,
    Fat1,
    Fat2,
    Gpu
}

impl fmt::Display for Queue {
      fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Queue::Normal => write!(f, "normal"),
            Queue::Express => write!(f, "express"),
            Queue::Fat1 => write!(f, "fat1"),
            Queue::Fat2 => write!(f, "fat2"),
            Queue::Gpu => write!(f, "gpu")
        }
    }
}

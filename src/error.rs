use std::{fmt, path::PathBuf};
use thiserror::Error;

use crate::schema::Field;

/// Pipeline stage a failure belongs to. Used to label errors in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Discover,
    Aggregate,
    Rank,
    Report,
    Write,
}

impl Stage {
    pub fn as_str(&self) -> &str {
        match self {
            Stage::Discover => "discover",
            Stage::Aggregate => "aggregate",
            Stage::Rank => "rank",
            Stage::Report => "report",
            Stage::Write => "write",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no input file matches {pattern}")]
    InputNotFound { pattern: String },

    #[error("invalid input pattern {pattern}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to read input {path}: {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("row {row}: no column for {field} (tried {candidates:?})")]
    Schema {
        row: u64,
        field: Field,
        candidates: Vec<String>,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("total approved count is zero, percentages are undefined")]
    ZeroTotal,

    #[error("failed to write {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::InputNotFound { .. } | PipelineError::InvalidPattern { .. } => {
                Stage::Discover
            }
            PipelineError::InputRead { .. } | PipelineError::Schema { .. } => Stage::Aggregate,
            PipelineError::InvalidArgument(_) => Stage::Rank,
            PipelineError::ZeroTotal => Stage::Report,
            PipelineError::OutputWrite { .. } => Stage::Write,
        }
    }
}

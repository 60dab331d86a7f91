//! Error types for the metas pipeline.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MetasError>;

/// Conditions that abort a run.
#[derive(Debug, Error)]
pub enum MetasError {
    #[error("no source files matching `{pattern}` in {}", dir.display())]
    NoSourceFiles { dir: PathBuf, pattern: String },

    #[error("no case-flow records loaded")]
    EmptyInput,

    #[error("essential column `{0}` not found in consolidated input")]
    MissingColumn(String),

    #[error("court `{court}`: invalid value `{value}` in column `{column}`")]
    InvalidCount {
        court: String,
        column: String,
        value: String,
    },

    #[error("court `{court}` has conflicting branch labels `{first}` and `{other}`")]
    BranchConflict {
        court: String,
        first: String,
        other: String,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A single source file that could not be read. Skipped by the loader.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}: line {line} has {found} fields, but the header has {expected}", path.display())]
    TooManyFields {
        path: PathBuf,
        line: u64,
        found: usize,
        expected: usize,
    },
}

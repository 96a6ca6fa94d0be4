//! Error type shared by the trace reader, generator and runner.

use std::path::PathBuf;

use sieve_size::{ConfigError, VerifyError};
use thiserror::Error;

/// Everything that can stop a simulation or a trace generation.
#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid policy configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("{policy} failed verification after {requests} requests: {source}")]
    Verify {
        policy: String,
        requests: u64,
        #[source]
        source: VerifyError,
    },

    #[error("no requests found in {}", .0.display())]
    EmptyTrace(PathBuf),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl SimulatorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SimulatorError>;

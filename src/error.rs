use std::{io, path::PathBuf};
use thiserror::Error;

/// Everything that can go wrong inside the engine. Evolution itself never fails on bad luck;
/// these cover host input, persistence, and configuration.
#[derive(Debug, Error)]
pub enum Error {
    #[error("expected {expected} inputs, got {got}")]
    Arity { expected: usize, got: usize },

    #[error("network produced a non-finite output")]
    NumericFault,

    #[error("i/o failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("unsupported genome schema version {0}")]
    SchemaVersion(u32),

    #[error("invalid genome: {0}")]
    InvalidGenome(String),

    #[error("unknown config key `{0}`")]
    UnknownKey(String),

    #[error("invalid value `{value}` for config key `{key}`")]
    InvalidValue { key: String, value: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("population went extinct in generation {0}")]
    Extinction(usize),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

use std::path::PathBuf;

use thiserror::Error;
use wmchunk_core::TrialSpecError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: invalid {column} list: {source}")]
    List {
        row: usize,
        column: &'static str,
        source: serde_json::Error,
    },

    #[error("row {row}: {source}")]
    Row {
        row: usize,
        source: TrialSpecError,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

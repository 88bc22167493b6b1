use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    #[error("chunk size must be at least 1")]
    ZeroChunkSize,
}

/// A trial definition that cannot be run. Always fatal to the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrialSpecError {
    #[error("trial file contains no trials")]
    EmptyPlan,

    #[error("row {row}: sequence is empty")]
    EmptySequence { row: usize },

    #[error("row {row}: chunk size must be at least 1")]
    ZeroChunkSize { row: usize },

    #[error("row {row}: symbol {symbol:?} is not a single character")]
    MultiCharSymbol { row: usize, symbol: String },

    #[error("row {row}: {field} must be a finite, non-negative number of seconds, got {value}")]
    InvalidDuration {
        row: usize,
        field: &'static str,
        value: f64,
    },

    #[error("row {row}: seq_length is {declared} but the sequence has {actual} symbols")]
    LengthMismatch {
        row: usize,
        declared: usize,
        actual: usize,
    },

    #[error("row {row}: masked retrieval trial has no preceding encoding trial")]
    UnpairedRetrieval { row: usize },

    #[error("row {row}: retrieval length {retrieval} differs from paired encoding length {encoding}")]
    PairLengthMismatch {
        row: usize,
        encoding: usize,
        retrieval: usize,
    },

    #[error("unknown {field} code {value}")]
    UnknownCode { field: &'static str, value: u8 },
}

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("display I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("display unavailable: {0}")]
    Unavailable(String),
}

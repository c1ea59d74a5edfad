use thiserror::Error;

/// Everything that can go wrong while building, training or querying a model
#[derive(Debug, Error)]
pub enum ElmError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("dimension mismatch: {context} (expected {expected}, got {actual})")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("model has not been trained")]
    Untrained,

    #[error("empty dataset: {0}")]
    EmptyData(String),

    #[error("numerical failure: {0}")]
    Numerical(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ElmError>;

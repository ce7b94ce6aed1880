use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("missing 0x prefix: {0}")]
    MissingPrefix(String),

    #[error("invalid batch id: {0}")]
    InvalidBatchId(String),

    #[error("batch {0} is already anchored")]
    AlreadyAnchored(String),
}

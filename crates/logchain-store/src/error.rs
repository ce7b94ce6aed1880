use logchain_types::BatchId;

/// Errors from batch store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("batch not found: {0}")]
    NotFound(BatchId),

    /// A record with this id is already stored.
    #[error("batch already exists: {0}")]
    DuplicateId(BatchId),

    /// Lock poisoned or backend otherwise unusable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

use logchain_ledger::LedgerError;
use logchain_store::StoreError;
use logchain_types::BatchId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnchorError {
    /// The record cannot be anchored as it stands. Never reaches the ledger.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("batch not found: {0}")]
    NotFound(BatchId),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl AnchorError {
    /// Whether the caller may retry later. Retrying after a timeout may put a
    /// second entry for the same fingerprint on the ledger.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Ledger(err) => err.is_retryable(),
            _ => false,
        }
    }
}

pub type AnchorResult<T> = Result<T, AnchorError>;

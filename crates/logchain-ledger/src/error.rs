use std::time::Duration;

use logchain_types::TxRef;

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Endpoint unreachable or the ledger refused the connection.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The confirmation wait elapsed. The transaction may still confirm.
    #[error("transaction {tx} not confirmed within {waited:?}")]
    Timeout { tx: TxRef, waited: Duration },

    /// The ledger expected a different sequence number for the sender.
    #[error("sequence conflict: ledger expects nonce {expected}, transaction used {submitted}")]
    SequenceConflict { expected: u64, submitted: u64 },

    #[error("ledger entry {index} not found (ledger holds {total})")]
    EntryNotFound { index: u64, total: u64 },

    #[error("transaction not found: {0}")]
    TxNotFound(TxRef),

    /// The ledger refused the transaction for a reason other than sequencing.
    #[error("transaction rejected: {0}")]
    Rejected(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl LedgerError {
    /// Whether a caller may reasonably retry after backing off.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout { .. })
    }
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

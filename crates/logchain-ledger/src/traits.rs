use async_trait::async_trait;
use logchain_types::{AccountId, BlockRef, Fingerprint, LedgerEntry, TxRef};

use crate::error::LedgerResult;
use crate::transaction::SignedTransaction;

/// A transaction that made it into a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_ref: TxRef,
    pub block_ref: BlockRef,
}

/// Outcome of a confirmed anchoring submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Submission {
    pub tx_ref: TxRef,
    pub block_ref: BlockRef,
    /// Sequence number the transaction was signed with.
    pub nonce: u64,
}

/// Raw access to a ledger network.
///
/// Implementations own connection setup and the wire format. They do not
/// serialize callers; that is the gateway's job.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Next sequence number the ledger will accept from `account`,
    /// counting transactions already broadcast but not yet mined.
    async fn next_nonce(&self, account: &AccountId) -> LedgerResult<u64>;

    /// Submit a signed transaction. Returns once the ledger has accepted it
    /// for inclusion, not once it is mined.
    async fn broadcast(&self, tx: &SignedTransaction) -> LedgerResult<TxRef>;

    /// Wait until the transaction is mined. Unbounded; callers impose the
    /// deadline.
    async fn wait_for_confirmation(&self, tx_ref: &TxRef) -> LedgerResult<Confirmation>;

    async fn total_entries(&self) -> LedgerResult<u64>;

    async fn entry_at(&self, index: u64) -> LedgerResult<LedgerEntry>;
}

/// The narrow ledger surface used by anchoring and reconciliation.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Anchor a fingerprint and wait (bounded) for confirmation.
    async fn submit(
        &self,
        fingerprint: &Fingerprint,
        batch_label: &str,
        content_label: &str,
    ) -> LedgerResult<Submission>;

    /// Number of entries currently on the ledger.
    async fn count(&self) -> LedgerResult<u64>;

    /// Entry at a ledger index; `EntryNotFound` when out of range.
    async fn entry_at(&self, index: u64) -> LedgerResult<LedgerEntry>;
}

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use logchain_types::{AccountId, BlockRef, LedgerEntry, TxRef};
use tokio::sync::Notify;
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::traits::{Confirmation, LedgerClient};
use crate::transaction::SignedTransaction;

/// In-process development ledger for tests, local demos, and embedding.
///
/// Enforces what a real network enforces for anchoring: chain id, sender
/// signature, and exact per-account sequence numbers. Entries become visible
/// only once their transaction is mined. In auto-mining mode every broadcast
/// is mined into its own block immediately; in manual mode transactions
/// wait in the pending pool until [`InMemoryChain::mine_pending`].
pub struct InMemoryChain {
    chain_id: u64,
    auto_mine: bool,
    offline: AtomicBool,
    inner: RwLock<ChainState>,
    mined: Notify,
}

#[derive(Default)]
struct ChainState {
    entries: Vec<LedgerEntry>,
    next_nonces: HashMap<AccountId, u64>,
    pending: Vec<SignedTransaction>,
    receipts: HashMap<TxRef, Confirmation>,
    /// (sender, nonce) of every mined transaction, in ledger order.
    mined_nonces: Vec<(AccountId, u64)>,
    height: u64,
}

impl InMemoryChain {
    /// Auto-mining chain.
    pub fn new(chain_id: u64) -> Self {
        Self::build(chain_id, true)
    }

    /// Chain that only mines on [`InMemoryChain::mine_pending`].
    pub fn manual(chain_id: u64) -> Self {
        Self::build(chain_id, false)
    }

    fn build(chain_id: u64, auto_mine: bool) -> Self {
        Self {
            chain_id,
            auto_mine,
            offline: AtomicBool::new(false),
            inner: RwLock::new(ChainState::default()),
            mined: Notify::new(),
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Simulate the endpoint going away (or coming back).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of broadcast transactions not yet mined.
    pub fn pending_count(&self) -> LedgerResult<usize> {
        Ok(self.read()?.pending.len())
    }

    /// Mine every pending transaction into one new block.
    ///
    /// Returns the block, or `None` when nothing was pending.
    pub fn mine_pending(&self) -> LedgerResult<Option<BlockRef>> {
        let block = {
            let mut state = self.write()?;
            Self::mine_locked(&mut state)
        };
        if block.is_some() {
            self.mined.notify_waiters();
        }
        Ok(block)
    }

    /// Sequence numbers of `account`'s mined transactions, in ledger order.
    pub fn mined_nonces(&self, account: &AccountId) -> LedgerResult<Vec<u64>> {
        Ok(self
            .read()?
            .mined_nonces
            .iter()
            .filter(|(sender, _)| sender == account)
            .map(|(_, nonce)| *nonce)
            .collect())
    }

    fn mine_locked(state: &mut ChainState) -> Option<BlockRef> {
        if state.pending.is_empty() {
            return None;
        }
        state.height += 1;
        let block_ref = BlockRef(state.height);
        let timestamp = now_secs();

        for tx in std::mem::take(&mut state.pending) {
            state.entries.push(LedgerEntry {
                fingerprint: tx.tx.call.fingerprint,
                owner: tx.tx.from,
                timestamp,
                batch_label: tx.tx.call.batch_label.clone(),
                content_label: tx.tx.call.content_label.clone(),
            });
            state.mined_nonces.push((tx.tx.from, tx.tx.nonce));
            state.receipts.insert(
                tx.tx_ref(),
                Confirmation {
                    tx_ref: tx.tx_ref(),
                    block_ref,
                },
            );
        }
        debug!(block = block_ref.0, entries = state.entries.len(), "mined block");
        Some(block_ref)
    }

    fn ensure_online(&self) -> LedgerResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("development chain is offline".into()));
        }
        Ok(())
    }

    fn read(&self) -> LedgerResult<RwLockReadGuard<'_, ChainState>> {
        self.inner
            .read()
            .map_err(|_| LedgerError::Unavailable("chain read lock poisoned".into()))
    }

    fn write(&self) -> LedgerResult<RwLockWriteGuard<'_, ChainState>> {
        self.inner
            .write()
            .map_err(|_| LedgerError::Unavailable("chain write lock poisoned".into()))
    }
}

impl Default for InMemoryChain {
    fn default() -> Self {
        Self::new(11_155_111)
    }
}

#[async_trait]
impl LedgerClient for InMemoryChain {
    async fn next_nonce(&self, account: &AccountId) -> LedgerResult<u64> {
        self.ensure_online()?;
        Ok(self.read()?.next_nonces.get(account).copied().unwrap_or(0))
    }

    async fn broadcast(&self, tx: &SignedTransaction) -> LedgerResult<TxRef> {
        self.ensure_online()?;
        if tx.tx.chain_id != self.chain_id {
            return Err(LedgerError::Rejected(format!(
                "wrong chain id {}, this ledger is {}",
                tx.tx.chain_id, self.chain_id
            )));
        }
        tx.verify()?;

        let mined = {
            let mut state = self.write()?;
            let expected = state.next_nonces.get(&tx.tx.from).copied().unwrap_or(0);
            if tx.tx.nonce != expected {
                return Err(LedgerError::SequenceConflict {
                    expected,
                    submitted: tx.tx.nonce,
                });
            }
            state.next_nonces.insert(tx.tx.from, expected + 1);
            state.pending.push(tx.clone());
            self.auto_mine && Self::mine_locked(&mut state).is_some()
        };
        if mined {
            self.mined.notify_waiters();
        }
        Ok(tx.tx_ref())
    }

    async fn wait_for_confirmation(&self, tx_ref: &TxRef) -> LedgerResult<Confirmation> {
        loop {
            let notified = self.mined.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let state = self.read()?;
                if let Some(confirmation) = state.receipts.get(tx_ref) {
                    return Ok(*confirmation);
                }
                if !state.pending.iter().any(|tx| tx.tx_ref() == *tx_ref) {
                    return Err(LedgerError::TxNotFound(*tx_ref));
                }
            }

            notified.await;
        }
    }

    async fn total_entries(&self) -> LedgerResult<u64> {
        self.ensure_online()?;
        Ok(self.read()?.entries.len() as u64)
    }

    async fn entry_at(&self, index: u64) -> LedgerResult<LedgerEntry> {
        self.ensure_online()?;
        let state = self.read()?;
        let total = state.entries.len() as u64;
        usize::try_from(index)
            .ok()
            .and_then(|i| state.entries.get(i))
            .cloned()
            .ok_or(LedgerError::EntryNotFound { index, total })
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

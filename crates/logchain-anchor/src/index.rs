use std::collections::HashMap;
use std::sync::Arc;

use logchain_ledger::LedgerGateway;
use logchain_types::{BatchRecord, Fingerprint};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::AnchorResult;
use crate::verifier::Reconciliation;

/// Reconciliation backed by an incrementally built fingerprint index.
///
/// Each lookup first reads the entries appended since the previous one, so
/// every ledger entry is fetched at most once. The index keeps the first
/// index seen per fingerprint, which gives the same answer as a full scan.
pub struct IndexedVerifier {
    ledger: Arc<dyn LedgerGateway>,
    state: Mutex<IndexState>,
}

#[derive(Default)]
struct IndexState {
    first_seen: HashMap<Fingerprint, u64>,
    /// Entries `0..scanned` are indexed.
    scanned: u64,
}

impl IndexedVerifier {
    pub fn new(ledger: Arc<dyn LedgerGateway>) -> Self {
        Self {
            ledger,
            state: Mutex::new(IndexState::default()),
        }
    }

    /// Index entries appended since the last refresh. Returns how many were read.
    ///
    /// Ledger reads happen without the index lock. Entries are merged in
    /// ledger order from the current high-water mark, so overlapping
    /// refreshes still record the first index of every fingerprint.
    pub async fn refresh(&self) -> AnchorResult<u64> {
        let start = self.state.lock().await.scanned;
        let total = self.ledger.count().await?;
        let mut fetched = Vec::new();
        for index in start..total {
            fetched.push(self.ledger.entry_at(index).await?.fingerprint);
        }

        let mut state = self.state.lock().await;
        if total > state.scanned {
            let skip = (state.scanned - start) as usize;
            for (index, fingerprint) in (state.scanned..total).zip(fetched.into_iter().skip(skip)) {
                state.first_seen.entry(fingerprint).or_insert(index);
            }
            state.scanned = total;
        }
        let read = total.saturating_sub(start);
        if read > 0 {
            debug!(read, indexed = state.scanned, "indexed ledger entries");
        }
        Ok(read)
    }

    /// Number of ledger entries indexed so far.
    pub async fn indexed(&self) -> u64 {
        self.state.lock().await.scanned
    }

    pub async fn verify_fingerprint(&self, fingerprint: &Fingerprint) -> AnchorResult<Reconciliation> {
        self.refresh().await?;
        let index = self.state.lock().await.first_seen.get(fingerprint).copied();
        Ok(Reconciliation::found(index))
    }

    pub async fn verify(&self, record: &BatchRecord) -> AnchorResult<Reconciliation> {
        let result = self.verify_fingerprint(record.fingerprint()).await?;
        if let Some(discrepancy) = result.discrepancy(record) {
            warn!(batch = %record.id(), ?discrepancy, "record disagrees with ledger");
        }
        Ok(result)
    }
}

use std::sync::Arc;

use logchain_ledger::LedgerGateway;
use logchain_types::{BatchRecord, Fingerprint};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AnchorResult;

/// Ledger truth for one fingerprint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub on_ledger: bool,
    /// Index of the earliest ledger entry carrying the fingerprint.
    pub matched_index: Option<u64>,
}

/// Disagreement between a record's status and the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discrepancy {
    /// The record says anchored but no ledger entry carries its fingerprint.
    ClaimedButAbsent,
    /// The ledger carries the fingerprint but the record was never marked.
    PresentButUnrecorded,
}

impl Reconciliation {
    pub(crate) fn found(index: Option<u64>) -> Self {
        Self {
            on_ledger: index.is_some(),
            matched_index: index,
        }
    }

    /// Compare against the record's own anchoring status.
    pub fn discrepancy(&self, record: &BatchRecord) -> Option<Discrepancy> {
        match (record.is_anchored(), self.on_ledger) {
            (true, false) => Some(Discrepancy::ClaimedButAbsent),
            (false, true) => Some(Discrepancy::PresentButUnrecorded),
            _ => None,
        }
    }
}

/// Proves a record's fingerprint is on the ledger by scanning every entry.
///
/// Reads `count` once, then entries `0..count` in order, stopping at the
/// first match. Entries appended during the scan may be missed; the next
/// call sees them. Cost is linear in ledger size, see [`crate::IndexedVerifier`].
pub struct ReconciliationVerifier {
    ledger: Arc<dyn LedgerGateway>,
}

impl ReconciliationVerifier {
    pub fn new(ledger: Arc<dyn LedgerGateway>) -> Self {
        Self { ledger }
    }

    pub async fn verify(&self, record: &BatchRecord) -> AnchorResult<Reconciliation> {
        let result = self.verify_fingerprint(record.fingerprint()).await?;
        if let Some(discrepancy) = result.discrepancy(record) {
            warn!(batch = %record.id(), ?discrepancy, "record disagrees with ledger");
        }
        Ok(result)
    }

    pub async fn verify_fingerprint(&self, fingerprint: &Fingerprint) -> AnchorResult<Reconciliation> {
        let total = self.ledger.count().await?;
        for index in 0..total {
            let entry = self.ledger.entry_at(index).await?;
            if entry.fingerprint == *fingerprint {
                debug!(%fingerprint, index, total, "fingerprint found on ledger");
                return Ok(Reconciliation::found(Some(index)));
            }
        }
        debug!(%fingerprint, total, "fingerprint not on ledger");
        Ok(Reconciliation::found(None))
    }
}

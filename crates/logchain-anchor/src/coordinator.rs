use std::collections::HashMap;
use std::sync::Arc;

use logchain_ledger::LedgerGateway;
use logchain_store::BatchStore;
use logchain_types::{BatchId, BatchRecord, BlockRef, TxRef};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{AnchorError, AnchorResult};

/// Result of an anchoring request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AnchorOutcome {
    pub batch_id: BatchId,
    pub tx_ref: TxRef,
    pub block_ref: Option<BlockRef>,
    /// `true` when the record was already anchored and no ledger call was made.
    pub already_anchored: bool,
}

impl AnchorOutcome {
    fn from_anchored(record: &BatchRecord, already_anchored: bool) -> Option<Self> {
        Some(Self {
            batch_id: record.id(),
            tx_ref: record.tx_ref()?,
            block_ref: record.block_ref(),
            already_anchored,
        })
    }
}

/// Drives batch records from `Unanchored` to `Anchored`.
///
/// A record is marked anchored only after the gateway reports a confirmed
/// transaction. Any ledger failure leaves it unanchored.
///
/// Calls for the same record are serialized: a second caller waits for the
/// first to finish and then sees the stored, anchored copy.
pub struct AnchorCoordinator {
    ledger: Arc<dyn LedgerGateway>,
    store: Arc<dyn BatchStore>,
    in_flight: Mutex<HashMap<BatchId, Arc<Mutex<()>>>>,
}

impl AnchorCoordinator {
    pub fn new(ledger: Arc<dyn LedgerGateway>, store: Arc<dyn BatchStore>) -> Self {
        Self {
            ledger,
            store,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerGateway> {
        &self.ledger
    }

    pub fn store(&self) -> &Arc<dyn BatchStore> {
        &self.store
    }

    /// Anchor the stored record with this id.
    pub async fn anchor_by_id(&self, id: &BatchId) -> AnchorResult<AnchorOutcome> {
        let record = self.store.get(id)?.ok_or(AnchorError::NotFound(*id))?;
        self.anchor(&record).await
    }

    /// Anchor `record`, or return its stored references if it is already
    /// anchored.
    ///
    /// The stored copy is consulted as well as the one passed in, so a stale
    /// caller copy does not cause a second submission.
    pub async fn anchor(&self, record: &BatchRecord) -> AnchorResult<AnchorOutcome> {
        if let Some(outcome) = short_circuit(record) {
            return Ok(outcome);
        }
        let id = record.id();
        let lock = self.record_lock(id).await;
        let result = {
            let _held = lock.lock().await;
            self.anchor_exclusive(id).await
        };
        self.release(id, lock).await;
        result
    }

    async fn record_lock(&self, id: BatchId) -> Arc<Mutex<()>> {
        let mut in_flight = self.in_flight.lock().await;
        let lock = in_flight.entry(id).or_default();
        if Arc::strong_count(lock) > 1 {
            debug!(batch = %id, "anchoring already in flight, waiting");
        }
        lock.clone()
    }

    async fn release(&self, id: BatchId, lock: Arc<Mutex<()>>) {
        let mut in_flight = self.in_flight.lock().await;
        // Map entry plus ours: nobody else is waiting.
        if Arc::strong_count(&lock) == 2 {
            in_flight.remove(&id);
        }
    }

    /// Runs with the record's in-flight lock held.
    async fn anchor_exclusive(&self, id: BatchId) -> AnchorResult<AnchorOutcome> {
        let current = self.store.get(&id)?.ok_or(AnchorError::NotFound(id))?;
        if let Some(outcome) = short_circuit(&current) {
            return Ok(outcome);
        }
        validate(&current)?;

        let batch_label = current
            .batch_label()
            .map(str::to_string)
            .unwrap_or_else(|| current.id().to_string());
        let content_label = current.content_ref().unwrap_or_default();

        let submission = match self
            .ledger
            .submit(current.fingerprint(), &batch_label, content_label)
            .await
        {
            Ok(submission) => submission,
            Err(err) => {
                warn!(batch = %current.id(), %err, "anchoring failed; record stays unanchored");
                return Err(err.into());
            }
        };

        let stored = self
            .store
            .mark_anchored(&current.id(), submission.tx_ref, submission.block_ref)?;
        if stored.tx_ref() != Some(submission.tx_ref) {
            warn!(
                batch = %stored.id(),
                ours = %submission.tx_ref,
                "record was anchored concurrently; keeping the first transaction"
            );
        }
        info!(
            batch = %stored.id(),
            fingerprint = %stored.fingerprint(),
            tx = %submission.tx_ref,
            block = %submission.block_ref,
            "batch anchored"
        );

        Ok(AnchorOutcome {
            batch_id: stored.id(),
            tx_ref: stored.tx_ref().unwrap_or(submission.tx_ref),
            block_ref: stored.block_ref(),
            already_anchored: false,
        })
    }
}

fn short_circuit(record: &BatchRecord) -> Option<AnchorOutcome> {
    if record.is_anchored() {
        AnchorOutcome::from_anchored(record, true)
    } else {
        None
    }
}

/// Checks applied before any ledger interaction.
pub fn validate(record: &BatchRecord) -> AnchorResult<()> {
    if record.fingerprint().is_null() {
        return Err(AnchorError::Validation(format!(
            "batch {} has a null fingerprint",
            record.id()
        )));
    }
    if record.line_count() == Some(0) {
        return Err(AnchorError::Validation(format!(
            "batch {} has no lines; empty batches have no fingerprint",
            record.id()
        )));
    }
    Ok(())
}

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use logchain_crypto::{fingerprint_lines, SigningKey};
use logchain_ledger::{
    InMemoryChain, LedgerGateway, LedgerResult, SerializedGateway, SigningIdentity, Submission,
};
use logchain_store::{BatchStore, InMemoryBatchStore};
use logchain_types::{BatchDraft, BatchRecord, Fingerprint, LedgerEntry};

use crate::coordinator::AnchorCoordinator;

/// Gateway over an auto-mining chain that records every submission.
pub struct CountingGateway {
    inner: SerializedGateway<InMemoryChain>,
    submitted: Mutex<Vec<Submission>>,
}

impl CountingGateway {
    pub fn new() -> Self {
        let identity = SigningIdentity::new(SigningKey::from_bytes([7; 32]), 11_155_111);
        Self {
            inner: SerializedGateway::new(Arc::new(InMemoryChain::new(11_155_111)), identity),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn submissions(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    pub fn nonces(&self) -> Vec<u64> {
        self.submitted.lock().unwrap().iter().map(|s| s.nonce).collect()
    }
}

#[async_trait]
impl LedgerGateway for CountingGateway {
    async fn submit(
        &self,
        fingerprint: &Fingerprint,
        batch_label: &str,
        content_label: &str,
    ) -> LedgerResult<Submission> {
        let submission = self.inner.submit(fingerprint, batch_label, content_label).await?;
        self.submitted.lock().unwrap().push(submission);
        Ok(submission)
    }

    async fn count(&self) -> LedgerResult<u64> {
        self.inner.count().await
    }

    async fn entry_at(&self, index: u64) -> LedgerResult<LedgerEntry> {
        self.inner.entry_at(index).await
    }
}

pub fn harness() -> (AnchorCoordinator, Arc<CountingGateway>, Arc<InMemoryBatchStore>) {
    let gateway = Arc::new(CountingGateway::new());
    let store = Arc::new(InMemoryBatchStore::new());
    let coordinator = AnchorCoordinator::new(gateway.clone(), store.clone());
    (coordinator, gateway, store)
}

/// Fingerprint `lines`, store the record, and return it.
pub fn record_for(store: &InMemoryBatchStore, lines: &[&[u8]]) -> BatchRecord {
    let record = BatchRecord::new(
        fingerprint_lines(lines.iter().copied()).unwrap(),
        BatchDraft {
            device_id: Some("devA23".into()),
            line_count: Some(lines.len() as u64),
            ..Default::default()
        },
    );
    store.insert(record.clone()).unwrap();
    record
}

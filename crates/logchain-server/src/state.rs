use std::sync::Arc;

use logchain_anchor::{AnchorCoordinator, AnchorResult, IndexedVerifier, Reconciliation, ReconciliationVerifier};
use logchain_ledger::LedgerGateway;
use logchain_store::BatchStore;
use logchain_types::BatchRecord;

use crate::config::ServerConfig;

/// Shared state behind every handler.
pub struct AppState {
    pub config: ServerConfig,
    pub store: Arc<dyn BatchStore>,
    pub ledger: Arc<dyn LedgerGateway>,
    pub coordinator: AnchorCoordinator,
    verifier: Verifier,
}

enum Verifier {
    Scan(ReconciliationVerifier),
    Indexed(IndexedVerifier),
}

impl AppState {
    pub fn new(config: ServerConfig, ledger: Arc<dyn LedgerGateway>, store: Arc<dyn BatchStore>) -> Self {
        let verifier = if config.indexed_verification {
            Verifier::Indexed(IndexedVerifier::new(ledger.clone()))
        } else {
            Verifier::Scan(ReconciliationVerifier::new(ledger.clone()))
        };
        Self {
            coordinator: AnchorCoordinator::new(ledger.clone(), store.clone()),
            config,
            store,
            ledger,
            verifier,
        }
    }

    pub async fn verify(&self, record: &BatchRecord) -> AnchorResult<Reconciliation> {
        match &self.verifier {
            Verifier::Scan(v) => v.verify(record).await,
            Verifier::Indexed(v) => v.verify(record).await,
        }
    }
}

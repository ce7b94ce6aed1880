use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use logchain_types::{Fingerprint, LedgerEntry, TxRef};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::memory::InMemoryChain;
use crate::traits::{LedgerClient, LedgerGateway, Submission};
use crate::transaction::{AnchorCall, SigningIdentity};

/// Gateway that serializes every submission for one signing identity.
///
/// The nonce slot is held across read-nonce, build, sign, and broadcast, so
/// two broadcasts from this gateway never share a sequence number and reach
/// the ledger in slot order. The confirmation wait runs after the slot is
/// released: a second submission can broadcast while the first is still
/// waiting to be mined.
pub struct SerializedGateway<C: LedgerClient> {
    client: Arc<C>,
    identity: SigningIdentity,
    /// Next nonce this gateway intends to use. `None` forces a fresh read.
    slot: Mutex<Option<u64>>,
    confirmation_timeout: Duration,
    sequence_retries: u32,
}

impl<C: LedgerClient> SerializedGateway<C> {
    pub fn new(client: Arc<C>, identity: SigningIdentity) -> Self {
        Self {
            client,
            identity,
            slot: Mutex::new(None),
            confirmation_timeout: Duration::from_secs(600),
            sequence_retries: 1,
        }
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    pub fn with_sequence_retries(mut self, retries: u32) -> Self {
        self.sequence_retries = retries;
        self
    }

    /// Build a gateway from validated configuration.
    pub fn from_config(client: Arc<C>, config: &LedgerConfig) -> LedgerResult<Self> {
        config.validate()?;
        Ok(Self::new(client, config.signing_identity()?)
            .with_confirmation_timeout(config.confirmation_timeout())
            .with_sequence_retries(config.sequence_retries))
    }

    pub fn identity(&self) -> &SigningIdentity {
        &self.identity
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Critical section: pick a nonce, sign, broadcast. Returns the
    /// broadcast reference and the nonce it was signed with.
    async fn broadcast_serialized(&self, call: AnchorCall) -> LedgerResult<(TxRef, u64)> {
        let account = self.identity.account();
        let mut slot = self.slot.lock().await;
        let mut conflicts = 0u32;

        loop {
            let on_chain = self.client.next_nonce(&account).await?;
            let nonce = slot.map_or(on_chain, |local| local.max(on_chain));
            debug!(%account, nonce, on_chain, "selected nonce");

            let tx = self.identity.sign(nonce, call.clone())?;
            match self.client.broadcast(&tx).await {
                Ok(tx_ref) => {
                    *slot = Some(nonce + 1);
                    info!(tx = %tx_ref, nonce, fingerprint = %call.fingerprint, "broadcast anchor transaction");
                    return Ok((tx_ref, nonce));
                }
                Err(err @ LedgerError::SequenceConflict { .. }) if conflicts < self.sequence_retries => {
                    conflicts += 1;
                    warn!(%err, attempt = conflicts, "stale nonce, re-reading sequence number");
                    *slot = None;
                }
                Err(err) => {
                    *slot = None;
                    return Err(err);
                }
            }
        }
    }
}

#[async_trait]
impl<C: LedgerClient + 'static> LedgerGateway for SerializedGateway<C> {
    async fn submit(
        &self,
        fingerprint: &Fingerprint,
        batch_label: &str,
        content_label: &str,
    ) -> LedgerResult<Submission> {
        let call = AnchorCall {
            fingerprint: *fingerprint,
            batch_label: batch_label.to_string(),
            content_label: content_label.to_string(),
        };
        let (tx_ref, nonce) = self.broadcast_serialized(call).await?;

        let waited = self.confirmation_timeout;
        let confirmation = match tokio::time::timeout(waited, self.client.wait_for_confirmation(&tx_ref)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(tx = %tx_ref, ?waited, "confirmation wait elapsed; transaction may still confirm");
                return Err(LedgerError::Timeout { tx: tx_ref, waited });
            }
        };

        info!(tx = %tx_ref, block = %confirmation.block_ref, nonce, "anchor transaction confirmed");
        Ok(Submission {
            tx_ref,
            block_ref: confirmation.block_ref,
            nonce,
        })
    }

    async fn count(&self) -> LedgerResult<u64> {
        self.client.total_entries().await
    }

    async fn entry_at(&self, index: u64) -> LedgerResult<LedgerEntry> {
        self.client.entry_at(index).await
    }
}

/// Open the ledger named by `config.endpoint`.
///
/// Only the in-process development ledger (`memory://`) is built in; any
/// other endpoint is a configuration error.
pub fn connect(config: &LedgerConfig) -> LedgerResult<Arc<dyn LedgerGateway>> {
    config.validate()?;
    if !config.is_memory() {
        return Err(LedgerError::Config(format!(
            "unsupported ledger endpoint {}; only {} is available",
            config.endpoint,
            LedgerConfig::MEMORY_ENDPOINT
        )));
    }
    let chain = Arc::new(InMemoryChain::new(config.chain_id));
    let gateway = SerializedGateway::from_config(chain, config)?;
    info!(
        endpoint = %config.endpoint,
        chain_id = config.chain_id,
        account = %gateway.identity().account(),
        "connected to ledger"
    );
    Ok(Arc::new(gateway))
}

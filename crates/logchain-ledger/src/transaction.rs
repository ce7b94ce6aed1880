use logchain_crypto::{Signature, SigningKey, VerifyingKey};
use logchain_types::{AccountId, Fingerprint, TxRef};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// Payload of the ledger's anchoring entry point.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorCall {
    pub fingerprint: Fingerprint,
    pub batch_label: String,
    pub content_label: String,
}

/// A transaction before signing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub from: AccountId,
    pub call: AnchorCall,
}

impl UnsignedTransaction {
    /// Canonical bytes covered by the signature.
    pub fn signing_bytes(&self) -> LedgerResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| LedgerError::Serialization(e.to_string()))
    }
}

/// A signed transaction ready for broadcast.
#[derive(Clone, Debug)]
pub struct SignedTransaction {
    pub tx: UnsignedTransaction,
    pub public_key: [u8; 32],
    pub signature: Signature,
    tx_ref: TxRef,
}

impl SignedTransaction {
    /// Hash identifying this transaction on the ledger.
    pub fn tx_ref(&self) -> TxRef {
        self.tx_ref
    }

    /// Check the signature and that the key belongs to the claimed sender.
    pub fn verify(&self) -> LedgerResult<()> {
        let key = VerifyingKey::from_bytes(self.public_key)
            .map_err(|e| LedgerError::Rejected(e.to_string()))?;
        if key.account_id() != self.tx.from {
            return Err(LedgerError::Rejected(format!(
                "public key does not belong to sender {}",
                self.tx.from
            )));
        }
        key.verify(&self.tx.signing_bytes()?, &self.signature)
            .map_err(|e| LedgerError::Rejected(e.to_string()))
    }
}

fn compute_tx_ref(signing_bytes: &[u8], signature: &Signature) -> TxRef {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"logchain-tx-v1:");
    hasher.update(signing_bytes);
    hasher.update(&signature.to_bytes());
    TxRef::from_raw(*hasher.finalize().as_bytes())
}

/// The single account that authors every anchoring transaction.
pub struct SigningIdentity {
    key: SigningKey,
    public: VerifyingKey,
    account: AccountId,
    chain_id: u64,
}

impl SigningIdentity {
    pub fn new(key: SigningKey, chain_id: u64) -> Self {
        let public = key.verifying_key();
        let account = public.account_id();
        Self {
            key,
            public,
            account,
            chain_id,
        }
    }

    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Build and sign an anchoring transaction with the given nonce.
    pub fn sign(&self, nonce: u64, call: AnchorCall) -> LedgerResult<SignedTransaction> {
        let tx = UnsignedTransaction {
            chain_id: self.chain_id,
            nonce,
            from: self.account,
            call,
        };
        let bytes = tx.signing_bytes()?;
        let signature = self.key.sign(&bytes);
        let tx_ref = compute_tx_ref(&bytes, &signature);
        Ok(SignedTransaction {
            tx,
            public_key: self.public.as_bytes(),
            signature,
            tx_ref,
        })
    }
}

impl std::fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("account", &self.account)
            .field("chain_id", &self.chain_id)
            .field("key", &self.key)
            .finish()
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::fingerprint::Fingerprint;
use crate::hex32;

/// Address of a signing identity on the ledger.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId([u8; 32]);

impl AccountId {
    pub const fn from_raw(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn parse(s: &str) -> Result<Self, TypeError> {
        hex32::parse(s).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex32::render(&self.0)
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId(0x{})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for AccountId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.to_hex()
    }
}

/// Reference to a ledger transaction (its hash).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxRef([u8; 32]);

impl TxRef {
    pub const fn from_raw(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn parse(s: &str) -> Result<Self, TypeError> {
        hex32::parse(s).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex32::render(&self.0)
    }
}

impl fmt::Debug for TxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxRef(0x{})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for TxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for TxRef {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TxRef> for String {
    fn from(tx: TxRef) -> Self {
        tx.to_hex()
    }
}

/// Height of the block that confirmed a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockRef(pub u64);

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The ledger's own record of one anchored fingerprint.
///
/// Entries are append-only and addressed by a ledger-assigned index starting
/// at 0. The ledger may hold several entries with the same fingerprint; the
/// lowest index is authoritative.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub fingerprint: Fingerprint,
    /// Identity that submitted the anchoring transaction.
    pub owner: AccountId,
    /// Ledger timestamp, seconds since the UNIX epoch.
    pub timestamp: u64,
    pub batch_label: String,
    pub content_label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tx_ref_renders_like_fingerprint() {
        let tx = TxRef::from_raw([0x0f; 32]);
        assert_eq!(tx.to_hex(), format!("0x{}", "0f".repeat(32)));
        assert_eq!(TxRef::parse(&tx.to_hex()).unwrap(), tx);
    }

    #[test]
    fn account_debug_is_short() {
        let id = AccountId::from_raw([0xaa; 32]);
        assert_eq!(format!("{id:?}"), "AccountId(0xaaaaaaaa)");
    }

    #[test]
    fn block_ref_is_transparent_in_json() {
        assert_eq!(serde_json::to_string(&BlockRef(42)).unwrap(), "42");
    }

    #[test]
    fn ledger_entry_json_shape() {
        let entry = LedgerEntry {
            fingerprint: Fingerprint::from_hash([1; 32]),
            owner: AccountId::from_raw([2; 32]),
            timestamp: 1_700_000_000,
            batch_label: "b-1".into(),
            content_label: "cid-1".into(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["fingerprint"], entry.fingerprint.to_hex());
        assert_eq!(value["owner"], entry.owner.to_hex());
        assert_eq!(value["batch_label"], "b-1");
    }
}

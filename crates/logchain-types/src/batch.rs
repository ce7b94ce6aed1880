use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::fingerprint::Fingerprint;
use crate::ledger::{BlockRef, TxRef};

/// Unique identifier for a batch record (UUID v7, so ids sort by creation).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(uuid::Uuid);

impl BatchId {
    /// Generate a new time-ordered batch ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// First 8 characters of the UUID.
    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BatchId({})", self.short_id())
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BatchId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| TypeError::InvalidBatchId(format!("{s}: {e}")))
    }
}

/// Anchoring lifecycle of a batch record.
///
/// The only legal transition is `Unanchored` → `Anchored`, applied at most
/// once per record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnchorStatus {
    #[default]
    Unanchored,
    Anchored,
}

impl AnchorStatus {
    /// Numeric flag used on the wire: 0 = unanchored, 1 = anchored.
    pub fn as_flag(&self) -> u8 {
        match self {
            Self::Unanchored => 0,
            Self::Anchored => 1,
        }
    }
}

/// Everything the submitting agent supplies when a batch is recorded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchDraft {
    pub device_id: Option<String>,
    pub user_id: Option<String>,
    /// Free-form label chosen by the device (not the record identifier).
    pub batch_label: Option<String>,
    pub fingerprint: Option<Fingerprint>,
    /// Off-ledger blob location, e.g. a content identifier.
    pub content_ref: Option<String>,
    pub line_count: Option<u64>,
}

/// Durable record of one fingerprinted batch and its anchoring status.
///
/// Owner references, fingerprint and line count are fixed at creation. The
/// anchoring fields change only through [`BatchRecord::mark_anchored`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRecord {
    id: BatchId,
    device_id: Option<String>,
    user_id: Option<String>,
    batch_label: Option<String>,
    fingerprint: Fingerprint,
    content_ref: Option<String>,
    line_count: Option<u64>,
    status: AnchorStatus,
    tx_ref: Option<TxRef>,
    block_ref: Option<BlockRef>,
    created_at: DateTime<Utc>,
}

impl BatchRecord {
    /// Create an unanchored record with a fresh id.
    pub fn new(fingerprint: Fingerprint, draft: BatchDraft) -> Self {
        Self {
            id: BatchId::new(),
            device_id: draft.device_id,
            user_id: draft.user_id,
            batch_label: draft.batch_label,
            fingerprint,
            content_ref: draft.content_ref,
            line_count: draft.line_count,
            status: AnchorStatus::Unanchored,
            tx_ref: None,
            block_ref: None,
            created_at: Utc::now(),
        }
    }

    /// Create a record from a draft, which must carry a fingerprint.
    pub fn from_draft(draft: BatchDraft) -> Option<Self> {
        let fingerprint = draft.fingerprint?;
        Some(Self::new(fingerprint, draft))
    }

    pub fn id(&self) -> BatchId {
        self.id
    }

    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn batch_label(&self) -> Option<&str> {
        self.batch_label.as_deref()
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn content_ref(&self) -> Option<&str> {
        self.content_ref.as_deref()
    }

    pub fn line_count(&self) -> Option<u64> {
        self.line_count
    }

    pub fn status(&self) -> AnchorStatus {
        self.status
    }

    pub fn is_anchored(&self) -> bool {
        self.status == AnchorStatus::Anchored
    }

    pub fn tx_ref(&self) -> Option<TxRef> {
        self.tx_ref
    }

    pub fn block_ref(&self) -> Option<BlockRef> {
        self.block_ref
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Apply the one-way transition to `Anchored`.
    ///
    /// Fails without modifying the record if it is already anchored.
    pub fn mark_anchored(&mut self, tx_ref: TxRef, block_ref: BlockRef) -> Result<(), TypeError> {
        if self.is_anchored() {
            return Err(TypeError::AlreadyAnchored(self.id.to_string()));
        }
        self.status = AnchorStatus::Anchored;
        self.tx_ref = Some(tx_ref);
        self.block_ref = Some(block_ref);
        Ok(())
    }
}

use logchain_types::{BatchId, BatchRecord, BlockRef, TxRef};
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;

/// Filters and paging for [`BatchStore::list`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchQuery {
    pub device_id: Option<String>,
    pub user_id: Option<String>,
    pub anchored: Option<bool>,
    pub skip: usize,
    pub limit: usize,
}

impl Default for BatchQuery {
    fn default() -> Self {
        Self {
            device_id: None,
            user_id: None,
            anchored: None,
            skip: 0,
            limit: 50,
        }
    }
}

impl BatchQuery {
    pub fn matches(&self, record: &BatchRecord) -> bool {
        if let Some(device) = &self.device_id {
            if record.device_id() != Some(device.as_str()) {
                return false;
            }
        }
        if let Some(user) = &self.user_id {
            if record.user_id() != Some(user.as_str()) {
                return false;
            }
        }
        match self.anchored {
            Some(anchored) => record.is_anchored() == anchored,
            None => true,
        }
    }
}

/// Durable home of batch records.
///
/// Implementations must satisfy:
/// - A record's id, owners, fingerprint and line count never change after insert.
/// - `mark_anchored` is atomic per record and first-writer-wins: once a record
///   is anchored its references are never replaced.
/// - Concurrent reads are always safe.
pub trait BatchStore: Send + Sync {
    /// Store a new record. Fails with `DuplicateId` if the id is taken.
    fn insert(&self, record: BatchRecord) -> StoreResult<()>;

    /// Returns `Ok(None)` if no record has this id.
    fn get(&self, id: &BatchId) -> StoreResult<Option<BatchRecord>>;

    /// Transition a record to `Anchored` with the given references.
    ///
    /// Returns the record as stored afterwards. If it was already anchored
    /// the stored references win and are returned unchanged.
    fn mark_anchored(&self, id: &BatchId, tx_ref: TxRef, block_ref: BlockRef) -> StoreResult<BatchRecord>;

    /// Records matching `query`, newest first.
    fn list(&self, query: &BatchQuery) -> StoreResult<Vec<BatchRecord>>;

    fn len(&self) -> StoreResult<usize>;

    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

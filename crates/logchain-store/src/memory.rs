use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use logchain_types::{BatchId, BatchRecord, BlockRef, TxRef};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::{BatchQuery, BatchStore};

/// In-memory, HashMap-based batch store.
///
/// Intended for tests, demos and embedding. Records are cloned on read.
pub struct InMemoryBatchStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    records: HashMap<BatchId, BatchRecord>,
    /// Insertion order, oldest first.
    order: Vec<BatchId>,
}

impl InMemoryBatchStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("batch store lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("batch store lock poisoned".into()))
    }
}

impl Default for InMemoryBatchStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchStore for InMemoryBatchStore {
    fn insert(&self, record: BatchRecord) -> StoreResult<()> {
        let mut inner = self.write()?;
        let id = record.id();
        if inner.records.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }
        inner.records.insert(id, record);
        inner.order.push(id);
        debug!(batch = %id, total = inner.order.len(), "stored batch");
        Ok(())
    }

    fn get(&self, id: &BatchId) -> StoreResult<Option<BatchRecord>> {
        Ok(self.read()?.records.get(id).cloned())
    }

    fn mark_anchored(&self, id: &BatchId, tx_ref: TxRef, block_ref: BlockRef) -> StoreResult<BatchRecord> {
        let mut inner = self.write()?;
        let record = inner.records.get_mut(id).ok_or(StoreError::NotFound(*id))?;
        if !record.is_anchored() {
            // Cannot fail: checked unanchored under the write lock.
            let _ = record.mark_anchored(tx_ref, block_ref);
        }
        Ok(record.clone())
    }

    fn list(&self, query: &BatchQuery) -> StoreResult<Vec<BatchRecord>> {
        let inner = self.read()?;
        Ok(inner
            .order
            .iter()
            .rev()
            .filter_map(|id| inner.records.get(id))
            .filter(|record| query.matches(record))
            .skip(query.skip)
            .take(query.limit)
            .cloned()
            .collect())
    }

    fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.records.len())
    }
}

impl std::fmt::Debug for InMemoryBatchStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len().unwrap_or(0);
        f.debug_struct("InMemoryBatchStore")
            .field("batch_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logchain_types::{BatchDraft, Fingerprint};

    fn record(device: &str, seed: u8) -> BatchRecord {
        BatchRecord::new(
            Fingerprint::from_hash([seed; 32]),
            BatchDraft {
                device_id: Some(device.into()),
                user_id: Some(format!("owner-of-{device}")),
                ..Default::default()
            },
        )
    }

    #[test]
    fn insert_and_get() {
        let store = InMemoryBatchStore::new();
        let r = record("dev-1", 1);
        let id = r.id();
        store.insert(r.clone()).unwrap();

        assert_eq!(store.get(&id).unwrap(), Some(r));
        assert_eq!(store.len().unwrap(), 1);
        assert!(store.get(&BatchId::new()).unwrap().is_none());
    }

    #[test]
    fn duplicate_id_rejected() {
        let store = InMemoryBatchStore::new();
        let r = record("dev-1", 1);
        store.insert(r.clone()).unwrap();
        assert!(matches!(store.insert(r), Err(StoreError::DuplicateId(_))));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn mark_anchored_first_writer_wins() {
        let store = InMemoryBatchStore::new();
        let r = record("dev-1", 1);
        let id = r.id();
        store.insert(r).unwrap();

        let first = TxRef::from_raw([1; 32]);
        let stored = store.mark_anchored(&id, first, BlockRef(3)).unwrap();
        assert!(stored.is_anchored());
        assert_eq!(stored.tx_ref(), Some(first));

        let again = store
            .mark_anchored(&id, TxRef::from_raw([2; 32]), BlockRef(4))
            .unwrap();
        assert_eq!(again.tx_ref(), Some(first));
        assert_eq!(again.block_ref(), Some(BlockRef(3)));
        assert_eq!(store.get(&id).unwrap().unwrap().tx_ref(), Some(first));
    }

    #[test]
    fn mark_anchored_unknown_is_not_found() {
        let store = InMemoryBatchStore::new();
        let err = store
            .mark_anchored(&BatchId::new(), TxRef::from_raw([1; 32]), BlockRef(1))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn list_is_newest_first_with_paging() {
        let store = InMemoryBatchStore::new();
        let ids: Vec<_> = (0..5)
            .map(|i| {
                let r = record("dev-1", i);
                let id = r.id();
                store.insert(r).unwrap();
                id
            })
            .collect();

        let all = store.list(&BatchQuery::default()).unwrap();
        let listed: Vec<_> = all.iter().map(BatchRecord::id).collect();
        assert_eq!(listed, ids.iter().rev().copied().collect::<Vec<_>>());

        let page = store
            .list(&BatchQuery {
                skip: 1,
                limit: 2,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.iter().map(BatchRecord::id).collect::<Vec<_>>(), vec![ids[3], ids[2]]);
    }

    #[test]
    fn list_filters() {
        let store = InMemoryBatchStore::new();
        let a = record("dev-a", 1);
        let b = record("dev-b", 2);
        let a_id = a.id();
        store.insert(a).unwrap();
        store.insert(b).unwrap();
        store
            .mark_anchored(&a_id, TxRef::from_raw([1; 32]), BlockRef(1))
            .unwrap();

        let by_device = store
            .list(&BatchQuery {
                device_id: Some("dev-b".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_device.len(), 1);
        assert_eq!(by_device[0].device_id(), Some("dev-b"));

        let by_user = store
            .list(&BatchQuery {
                user_id: Some("owner-of-dev-a".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_user.len(), 1);

        let anchored = store
            .list(&BatchQuery {
                anchored: Some(true),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(anchored.len(), 1);
        assert_eq!(anchored[0].id(), a_id);

        let pending = store
            .list(&BatchQuery {
                anchored: Some(false),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert!(!pending[0].is_anchored());
    }

    #[test]
    fn usable_as_trait_object() {
        let store: Box<dyn BatchStore> = Box::new(InMemoryBatchStore::new());
        assert!(store.is_empty().unwrap());
        store.insert(record("dev", 1)).unwrap();
        assert!(!store.is_empty().unwrap());
    }
}

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Owned collections kept by a node's local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Allocations,
    Deployments,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Allocations => "allocations",
            Collection::Deployments => "deployments",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored record. `data` is the item payload without id or links.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub owner: String,
    pub data: serde_json::Value,
    pub created_at: OffsetDateTime,
}

impl Record {
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(self.data.clone())
            .map_err(|e| StoreError::Corrupt(self.id.clone(), e.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("record {0} not found")]
    NotFound(String),
    #[error("record {0} is corrupt: {1}")]
    Corrupt(String, String),
}

/// Backend-agnostic keyed store for records owned by a user.
///
/// Every operation is scoped by `owner`: a caller never sees,
///  replaces or removes another owner's records.
#[async_trait]
pub trait RecordStore: Send + Sync + fmt::Debug {
    /// Total number of the owner's records plus the
    ///  `[offset, offset + limit)` slice, newest first.
    async fn list(
        &self,
        collection: Collection,
        owner: &str,
        offset: u64,
        limit: u64,
    ) -> Result<(u64, Vec<Record>), StoreError>;

    async fn get(
        &self,
        collection: Collection,
        id: &str,
        owner: &str,
    ) -> Result<Option<Record>, StoreError>;

    /// Insert a new record (`id == None`) or replace the data of
    ///  an existing one. Returns the record id.
    async fn put(
        &self,
        collection: Collection,
        id: Option<&str>,
        owner: &str,
        data: serde_json::Value,
    ) -> Result<String, StoreError>;

    /// Returns whether a record was removed.
    async fn delete(&self, collection: Collection, id: &str, owner: &str)
        -> Result<bool, StoreError>;

    /// Cheap liveness check used by the readiness endpoint.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// In-memory record store, mostly for tests and single-node dev runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    /// Monotonic insertion counter; defines creation order
    seq: u64,
    /// collection -> seq -> record
    records: HashMap<Collection, BTreeMap<u64, Record>>,
    /// collection -> id -> seq
    index: HashMap<Collection, HashMap<String, u64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, MemoryStoreInner>, StoreError> {
        self.inner
            .read()
            .map_err(|e| StoreError::Unavailable(format!("failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, MemoryStoreInner>, StoreError> {
        self.inner
            .write()
            .map_err(|e| StoreError::Unavailable(format!("failed to acquire write lock: {}", e)))
    }
}

impl MemoryStoreInner {
    fn lookup(&self, collection: Collection, id: &str) -> Option<&Record> {
        let seq = self.index.get(&collection)?.get(id)?;
        self.records.get(&collection)?.get(seq)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list(
        &self,
        collection: Collection,
        owner: &str,
        offset: u64,
        limit: u64,
    ) -> Result<(u64, Vec<Record>), StoreError> {
        let inner = self.read()?;
        let Some(records) = inner.records.get(&collection) else {
            return Ok((0, Vec::new()));
        };

        let owned: Vec<&Record> = records
            .values()
            .rev()
            .filter(|record| record.owner == owner)
            .collect();
        let total = owned.len() as u64;
        let page = owned
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok((total, page))
    }

    async fn get(
        &self,
        collection: Collection,
        id: &str,
        owner: &str,
    ) -> Result<Option<Record>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .lookup(collection, id)
            .filter(|record| record.owner == owner)
            .cloned())
    }

    async fn put(
        &self,
        collection: Collection,
        id: Option<&str>,
        owner: &str,
        data: serde_json::Value,
    ) -> Result<String, StoreError> {
        let mut inner = self.write()?;

        if let Some(id) = id {
            let seq = match inner.index.get(&collection).and_then(|ids| ids.get(id)) {
                Some(seq) => *seq,
                None => return Err(StoreError::NotFound(id.to_string())),
            };
            let record = inner
                .records
                .get_mut(&collection)
                .and_then(|records| records.get_mut(&seq))
                .filter(|record| record.owner == owner)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            record.data = data;
            return Ok(id.to_string());
        }

        inner.seq += 1;
        let seq = inner.seq;
        let id = new_record_id();
        inner
            .records
            .entry(collection)
            .or_default()
            .insert(
                seq,
                Record {
                    id: id.clone(),
                    owner: owner.to_string(),
                    data,
                    created_at: OffsetDateTime::now_utc(),
                },
            );
        inner
            .index
            .entry(collection)
            .or_default()
            .insert(id.clone(), seq);

        Ok(id)
    }

    async fn delete(
        &self,
        collection: Collection,
        id: &str,
        owner: &str,
    ) -> Result<bool, StoreError> {
        let mut inner = self.write()?;

        let owned = inner
            .lookup(collection, id)
            .map(|record| record.owner == owner)
            .unwrap_or(false);
        if !owned {
            return Ok(false);
        }

        let seq = inner
            .index
            .get_mut(&collection)
            .and_then(|ids| ids.remove(id));
        if let (Some(seq), Some(records)) = (seq, inner.records.get_mut(&collection)) {
            records.remove(&seq);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_is_newest_first_and_owner_scoped() {
        let store = MemoryStore::new();
        let a = store
            .put(Collection::Allocations, None, "alice", json!({"n": 1}))
            .await
            .unwrap();
        store
            .put(Collection::Allocations, None, "bob", json!({"n": 2}))
            .await
            .unwrap();
        let c = store
            .put(Collection::Allocations, None, "alice", json!({"n": 3}))
            .await
            .unwrap();

        let (total, records) = store
            .list(Collection::Allocations, "alice", 0, 10)
            .await
            .unwrap();
        assert_eq!(total, 2);
        let ids: Vec<_> = records.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![c, a.clone()]);

        let (total, records) = store
            .list(Collection::Allocations, "alice", 1, 10)
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(records[0].id, a);

        let (total, records) = store
            .list(Collection::Deployments, "alice", 0, 10)
            .await
            .unwrap();
        assert_eq!((total, records.len()), (0, 0));
    }

    #[tokio::test]
    async fn test_replace_keeps_id_and_creation_time() {
        let store = MemoryStore::new();
        let id = store
            .put(Collection::Allocations, None, "alice", json!({"v": 1}))
            .await
            .unwrap();
        let before = store
            .get(Collection::Allocations, &id, "alice")
            .await
            .unwrap()
            .unwrap();

        let replaced = store
            .put(Collection::Allocations, Some(&id), "alice", json!({"v": 2}))
            .await
            .unwrap();
        assert_eq!(replaced, id);

        let after = store
            .get(Collection::Allocations, &id, "alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.data, json!({"v": 2}));
        assert_eq!(after.created_at, before.created_at);
    }

    #[tokio::test]
    async fn test_other_owner_cannot_touch_record() {
        let store = MemoryStore::new();
        let id = store
            .put(Collection::Deployments, None, "alice", json!({}))
            .await
            .unwrap();

        assert!(store
            .get(Collection::Deployments, &id, "mallory")
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            store
                .put(Collection::Deployments, Some(&id), "mallory", json!({}))
                .await,
            Err(StoreError::NotFound(_))
        ));
        assert!(!store
            .delete(Collection::Deployments, &id, "mallory")
            .await
            .unwrap());
        assert!(store
            .delete(Collection::Deployments, &id, "alice")
            .await
            .unwrap());
        assert!(store
            .get(Collection::Deployments, &id, "alice")
            .await
            .unwrap()
            .is_none());
    }
}

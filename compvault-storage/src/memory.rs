//! In-memory [`RecordStore`] for tests and local-only use.

use crate::error::{StorageError, StorageResult};
use crate::record::SecureStorageRecord;
use crate::store::RecordStore;
use async_trait::async_trait;
use compvault_index::IndexToken;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Default)]
struct Collection {
    /// Insertion order of ids.
    order: Vec<String>,
    records: HashMap<String, SecureStorageRecord>,
    /// Unique token → owning record id.
    unique: HashMap<IndexToken, String>,
}

impl Collection {
    fn remove_unique_for(&mut self, id: &str) {
        self.unique.retain(|_, owner| owner != id);
    }
}

/// Thread-safe collection map. Cloning shares the same data.
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in a collection.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, |c| c.records.len())
    }

    pub async fn is_empty(&self, collection: &str) -> bool {
        self.len(collection).await == 0
    }

    /// Deletes a record and releases its unique tokens.
    pub async fn remove_record(
        &self,
        collection: &str,
        id: &str,
    ) -> StorageResult<SecureStorageRecord> {
        let mut guard = self.collections.write().await;
        let not_found = || StorageError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        };
        let coll = guard.get_mut(collection).ok_or_else(not_found)?;
        let record = coll.records.remove(id).ok_or_else(not_found)?;
        coll.order.retain(|existing| existing != id);
        coll.remove_unique_for(id);
        Ok(record)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn write_record(
        &self,
        collection: &str,
        record: SecureStorageRecord,
    ) -> StorageResult<Option<SecureStorageRecord>> {
        let mut guard = self.collections.write().await;
        let coll = guard.entry(collection.to_string()).or_default();

        // Conflict check and insert happen under the same write lock.
        for (_, token) in record.indexed.unique_tokens() {
            if let Some(owner) = coll.unique.get(token) {
                if owner != &record.id {
                    warn!(collection, "unique token already held by another record");
                    return Err(StorageError::UniqueConflict {
                        collection: collection.to_string(),
                        token: token.clone(),
                    });
                }
            }
        }

        let id = record.id.clone();
        if coll.records.contains_key(&id) {
            coll.remove_unique_for(&id);
        } else {
            coll.order.push(id.clone());
        }
        for (_, token) in record.indexed.unique_tokens() {
            coll.unique.insert(token.clone(), id.clone());
        }
        coll.records.insert(id.clone(), record.clone());

        debug!(collection, id = %id, mode = record.payload.mode(), "wrote record");
        Ok(Some(record))
    }

    async fn read_record(
        &self,
        collection: &str,
        id: &str,
    ) -> StorageResult<Option<SecureStorageRecord>> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(collection)
            .and_then(|c| c.records.get(id))
            .cloned())
    }

    async fn query_records(
        &self,
        collection: &str,
        tokens: &[IndexToken],
    ) -> StorageResult<Vec<SecureStorageRecord>> {
        let guard = self.collections.read().await;
        let Some(coll) = guard.get(collection) else {
            return Ok(Vec::new());
        };
        let matches: Vec<SecureStorageRecord> = coll
            .order
            .iter()
            .filter_map(|id| coll.records.get(id))
            .filter(|r| tokens.iter().any(|t| r.indexed.contains(t)))
            .cloned()
            .collect();
        debug!(collection, tokens = tokens.len(), matches = matches.len(), "queried records");
        Ok(matches)
    }
}

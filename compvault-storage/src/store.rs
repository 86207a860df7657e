use crate::error::StorageResult;
use crate::record::SecureStorageRecord;
use async_trait::async_trait;
use compvault_index::IndexToken;

/// Persists and retrieves opaque records keyed by index tokens.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Stores `record`, replacing any record with the same id.
    ///
    /// Must reject the write with `StorageError::UniqueConflict` if another
    /// record in the collection holds one of its unique tokens, checked
    /// atomically with the insert. Returns the stored record, or `None` if the
    /// backend does not echo writes.
    async fn write_record(
        &self,
        collection: &str,
        record: SecureStorageRecord,
    ) -> StorageResult<Option<SecureStorageRecord>>;

    /// `None` when the id is unknown.
    async fn read_record(
        &self,
        collection: &str,
        id: &str,
    ) -> StorageResult<Option<SecureStorageRecord>>;

    /// Records bearing at least one of `tokens`, in write order.
    async fn query_records(
        &self,
        collection: &str,
        tokens: &[IndexToken],
    ) -> StorageResult<Vec<SecureStorageRecord>>;
}

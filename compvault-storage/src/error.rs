use compvault_index::IndexToken;
use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Another record in the collection already holds this unique token.
    #[error("unique index conflict in {collection}: {token}")]
    UniqueConflict { collection: String, token: IndexToken },

    #[error("record {id} not found in {collection}")]
    NotFound { collection: String, id: String },

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

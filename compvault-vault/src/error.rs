//! Vault error taxonomy.
//!
//! Lower-layer errors are folded into the same categories whichever crate
//! raised them: an AEAD tag failure is `Integrity` whether it surfaced from
//! the capability or the envelope builder. Storage errors pass through
//! untouched.

use compvault_composition::CompositionError;
use compvault_crypto::CryptoError;
use compvault_envelope::{EnvelopeError, MessageError};
use compvault_index::IndexError;
use compvault_storage::StorageError;
use compvault_types::KeyId;
use thiserror::Error;

pub type VaultResult<T> = Result<T, VaultError>;

#[derive(Debug, Error)]
pub enum VaultError {
    /// Rejected before any cryptographic work.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("signature error: {0}")]
    Signature(String),

    #[error("encapsulation error: {0}")]
    Encapsulation(String),

    #[error("integrity check failed: {0}")]
    Integrity(String),

    #[error("no recipient entry for kid {0}")]
    RecipientKeyNotFound(KeyId),

    /// A stored record already carries this unique attribute value.
    #[error("duplicate value for unique attribute {attribute} in {collection}")]
    DuplicateAttribute { attribute: String, collection: String },

    #[error("malformed record: {0}")]
    Malformed(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("composition error: {0}")]
    Composition(#[from] CompositionError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("message error: {0}")]
    Message(MessageError),

    #[error("crypto error: {0}")]
    Crypto(CryptoError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A blocking crypto worker panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Task(String),
}

impl From<CryptoError> for VaultError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::Signature(msg) => VaultError::Signature(msg),
            CryptoError::Encapsulation(msg) | CryptoError::Decapsulation(msg) => {
                VaultError::Encapsulation(msg)
            }
            CryptoError::Authentication => VaultError::Integrity("authentication failed".into()),
            other => VaultError::Crypto(other),
        }
    }
}

impl From<EnvelopeError> for VaultError {
    fn from(err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::Configuration(msg) => VaultError::Configuration(msg),
            EnvelopeError::RecipientKeyNotFound(kid) => VaultError::RecipientKeyNotFound(kid),
            EnvelopeError::Integrity(msg) => VaultError::Integrity(msg),
            EnvelopeError::Crypto(e) => e.into(),
            EnvelopeError::Serialization(e) => VaultError::Serialization(e),
            other @ (EnvelopeError::Malformed(_) | EnvelopeError::Compression(_)) => {
                VaultError::Malformed(other.to_string())
            }
        }
    }
}

impl From<MessageError> for VaultError {
    fn from(err: MessageError) -> Self {
        match err {
            MessageError::Envelope(e) => e.into(),
            MessageError::Crypto(e) => e.into(),
            MessageError::MissingKey(what) => {
                VaultError::Configuration(format!("missing {what} key"))
            }
            other => VaultError::Message(other),
        }
    }
}

impl From<tokio::task::JoinError> for VaultError {
    fn from(err: tokio::task::JoinError) -> Self {
        VaultError::Task(err.to_string())
    }
}

//! Envelope and message error types.

use compvault_crypto::CryptoError;
use compvault_types::KeyId;
use thiserror::Error;

pub type EnvelopeResult<T> = Result<T, EnvelopeError>;

/// Errors from building or opening an [`crate::Envelope`].
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Caller or deployment mistake, raised before any cryptographic work.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The envelope carries no entry for the caller's kid.
    #[error("no recipient entry for kid {0}")]
    RecipientKeyNotFound(KeyId),

    /// Tag mismatch, aad mismatch or CEK unwrap failure.
    #[error("integrity check failed: {0}")]
    Integrity(String),

    #[error("malformed envelope: {0}")]
    Malformed(String),

    #[error("compression error: {0}")]
    Compression(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type MessageResult<T> = Result<T, MessageError>;

/// Errors from packing or unpacking a [`crate::Message`].
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("malformed message: {0}")]
    Malformed(String),

    #[error("message expired at {0}")]
    Expired(i64),

    #[error("message not valid before {0}")]
    NotYetValid(i64),

    /// A signed token wrapping ciphertext: encrypt-then-sign is refused.
    #[error("signed token wraps an encrypted envelope")]
    InvalidOrder,

    /// The adapter's pack mode needs a key that was not supplied.
    #[error("missing {0} key")]
    MissingKey(&'static str),

    #[error("envelope error: {0}")]
    Envelope(#[from] EnvelopeError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

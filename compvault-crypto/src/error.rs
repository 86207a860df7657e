//! Crypto error types.

use thiserror::Error;

/// Result type for capability operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors surfaced by a [`crate::CryptoCapability`].
///
/// A cryptographically invalid signature is *not* an error; `verify`
/// reports it as `Ok(false)`. These variants cover unsupported inputs,
/// malformed material and authentication failures on decrypt.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("signature error: {0}")]
    Signature(String),

    #[error("encapsulation failed: {0}")]
    Encapsulation(String),

    #[error("decapsulation failed: {0}")]
    Decapsulation(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("authentication failed (wrong key or tampered data)")]
    Authentication,

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("malformed input: {0}")]
    Malformed(String),
}

//! The capability boundary every cryptographic operation goes through.

use crate::error::CryptoResult;
use crate::material::{PrivateKeyMaterial, SecretBytes};
use compvault_types::RecipientKey;

/// Output of a KEM encapsulation.
#[derive(Debug, Clone)]
pub struct Encapsulation {
    pub shared_secret: SecretBytes,
    pub encapsulated_key: Vec<u8>,
}

/// AEAD ciphertext with its detached authentication tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AeadOutput {
    pub ciphertext: Vec<u8>,
    pub tag: Vec<u8>,
}

/// Pluggable signature, KEM and AEAD primitives.
///
/// Implementations own every raw key byte. Callers pass key handles and
/// opaque algorithm identifiers; an identifier the implementation does not
/// support is reported as `CryptoError::UnsupportedAlgorithm`.
pub trait CryptoCapability: Send + Sync {
    /// Signs `message`. `alg` defaults to the key's own algorithm.
    fn sign(
        &self,
        message: &[u8],
        key: &PrivateKeyMaterial,
        alg: Option<&str>,
    ) -> CryptoResult<Vec<u8>>;

    /// Verifies a detached signature.
    ///
    /// Returns `Ok(false)` for a well-formed but invalid signature. Only
    /// malformed keys or signatures (wrong length, undecodable) are errors.
    fn verify(
        &self,
        message: &[u8],
        signature: &[u8],
        public_key: &RecipientKey,
        alg: Option<&str>,
    ) -> CryptoResult<bool>;

    /// Encapsulates a fresh shared secret to the recipient's public key.
    fn encapsulate(&self, recipient: &RecipientKey) -> CryptoResult<Encapsulation>;

    /// Recovers the shared secret from an encapsulated key.
    fn decapsulate(
        &self,
        encapsulated_key: &[u8],
        key: &PrivateKeyMaterial,
    ) -> CryptoResult<SecretBytes>;

    /// Encrypts with a detached tag.
    fn aead_encrypt(
        &self,
        enc: &str,
        key: &SecretBytes,
        iv: &[u8],
        aad: &[u8],
        plaintext: &[u8],
    ) -> CryptoResult<AeadOutput>;

    /// Decrypts and authenticates; a tag mismatch is `CryptoError::Authentication`.
    fn aead_decrypt(
        &self,
        enc: &str,
        key: &SecretBytes,
        iv: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
    ) -> CryptoResult<Vec<u8>>;

    /// Fresh random content key sized for `enc`.
    fn generate_content_key(&self, enc: &str) -> CryptoResult<SecretBytes>;

    /// Fresh random IV sized for `enc`.
    fn generate_iv(&self, enc: &str) -> CryptoResult<Vec<u8>>;

    /// HKDF-style derivation of `len` bytes.
    fn derive_key(
        &self,
        ikm: &SecretBytes,
        salt: &[u8],
        info: &[u8],
        len: usize,
    ) -> CryptoResult<SecretBytes>;
}

//! Content-derived key identifiers.

use compvault_types::{KeyId, RecipientKey, b64};
use sha2::{Digest, Sha256};

/// `kid = b64url(SHA-256(alg || 0x00 || public_key))`.
///
/// Binding the algorithm tag keeps identical bytes under two families from
/// sharing an identifier.
pub fn key_fingerprint(alg: &str, public_key: &[u8]) -> KeyId {
    let mut hasher = Sha256::new();
    hasher.update(alg.as_bytes());
    hasher.update([0u8]);
    hasher.update(public_key);
    KeyId::new(b64::encode(hasher.finalize()))
}

/// Builds a [`RecipientKey`] whose kid is the fingerprint of its material.
pub fn recipient_key(alg: &str, public_key: Vec<u8>) -> RecipientKey {
    let kid = key_fingerprint(alg, &public_key);
    RecipientKey::new(kid, alg, public_key)
}

//! Envelope wire shape and the recipient-binding digest.

use crate::error::{EnvelopeError, EnvelopeResult};
use crate::header::{ProtectedHeader, RecipientHeader};
use compvault_types::{KeyId, b64};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

/// One recipient's encapsulated CEK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientEntry {
    #[serde(with = "compvault_types::b64::bytes")]
    pub(crate) encrypted_key: Vec<u8>,
    pub(crate) header: RecipientHeader,
}

impl RecipientEntry {
    pub fn encrypted_key(&self) -> &[u8] {
        &self.encrypted_key
    }

    pub fn header(&self) -> &RecipientHeader {
        &self.header
    }

    pub fn kid(&self) -> &KeyId {
        &self.header.kid
    }
}

/// Encrypted record: immutable once built. Any change means re-encrypting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub(crate) protected: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) unprotected: Option<serde_json::Map<String, serde_json::Value>>,
    pub(crate) recipients: Vec<RecipientEntry>,
    #[serde(with = "compvault_types::b64::bytes")]
    pub(crate) iv: Vec<u8>,
    #[serde(with = "compvault_types::b64::bytes")]
    pub(crate) ciphertext: Vec<u8>,
    #[serde(with = "compvault_types::b64::bytes")]
    pub(crate) tag: Vec<u8>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "compvault_types::b64::opt_bytes"
    )]
    pub(crate) aad: Option<Vec<u8>>,
}

/// `SHA-256(protectedB64 || "." || sortedUniqueKids.join(","))`.
///
/// Duplicate kids collapse to one entry before hashing.
pub fn compute_aad<'a>(protected_b64: &str, kids: impl IntoIterator<Item = &'a KeyId>) -> Vec<u8> {
    let kids: BTreeSet<&str> = kids.into_iter().map(KeyId::as_str).collect();
    let joined = kids.into_iter().collect::<Vec<_>>().join(",");

    let mut hasher = Sha256::new();
    hasher.update(protected_b64.as_bytes());
    hasher.update(b".");
    hasher.update(joined.as_bytes());
    hasher.finalize().to_vec()
}

impl Envelope {
    pub fn protected(&self) -> &str {
        &self.protected
    }

    pub fn unprotected(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.unprotected.as_ref()
    }

    pub fn recipients(&self) -> &[RecipientEntry] {
        &self.recipients
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn tag(&self) -> &[u8] {
        &self.tag
    }

    pub fn aad(&self) -> Option<&[u8]> {
        self.aad.as_deref()
    }

    /// Decodes the protected header.
    pub fn header(&self) -> EnvelopeResult<ProtectedHeader> {
        let raw = b64::decode(&self.protected)
            .map_err(|e| EnvelopeError::Malformed(format!("protected header: {e}")))?;
        serde_json::from_slice(&raw)
            .map_err(|e| EnvelopeError::Malformed(format!("protected header: {e}")))
    }

    pub fn kids(&self) -> impl Iterator<Item = &KeyId> {
        self.recipients.iter().map(RecipientEntry::kid)
    }

    pub fn recipient(&self, kid: &KeyId) -> Option<&RecipientEntry> {
        self.recipients.iter().find(|r| r.kid() == kid)
    }

    /// Binding digest recomputed from the header and kid list as received.
    pub fn expected_aad(&self) -> Vec<u8> {
        compute_aad(&self.protected, self.kids())
    }

    /// Structural checks that need no key material.
    pub fn validate(&self) -> EnvelopeResult<()> {
        if self.recipients.is_empty() {
            return Err(EnvelopeError::Malformed("no recipients".into()));
        }
        if self.iv.is_empty() || self.tag.is_empty() {
            return Err(EnvelopeError::Malformed("missing iv or tag".into()));
        }
        if self.recipients.iter().any(|r| r.encrypted_key.is_empty()) {
            return Err(EnvelopeError::Malformed("empty encrypted_key".into()));
        }
        Ok(())
    }

    pub fn to_json(&self) -> EnvelopeResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> EnvelopeResult<Self> {
        let envelope: Envelope = serde_json::from_str(json)
            .map_err(|e| EnvelopeError::Malformed(format!("envelope json: {e}")))?;
        envelope.validate()?;
        Ok(envelope)
    }
}

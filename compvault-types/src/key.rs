//! Recipient addressing: key identifiers and public recipient keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable, content-derived key identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyId(String);

impl KeyId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeyId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for KeyId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Public key record for one recipient (or verifier).
///
/// Immutable once issued: fields are only readable. `alg` names the
/// KEM or signature family and is round-tripped without interpretation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientKey {
    kid: KeyId,
    alg: String,
    #[serde(with = "crate::b64::bytes")]
    public_key: Vec<u8>,
}

impl RecipientKey {
    pub fn new(kid: KeyId, alg: impl Into<String>, public_key: Vec<u8>) -> Self {
        Self {
            kid,
            alg: alg.into(),
            public_key,
        }
    }

    pub fn kid(&self) -> &KeyId {
        &self.kid
    }

    pub fn alg(&self) -> &str {
        &self.alg
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }
}

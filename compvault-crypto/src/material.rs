//! Key material wrappers. Secret bytes are zeroized on drop and never
//! printed by `Debug`.

use compvault_types::{KeyId, RecipientKey};
use std::fmt;
use zeroize::Zeroizing;

/// Opaque secret bytes: content keys, shared secrets, derived KEKs.
#[derive(Clone)]
pub struct SecretBytes(Zeroizing<Vec<u8>>);

impl SecretBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Raw access for capability implementations only.
    pub fn expose_secret(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes([REDACTED; {}])", self.0.len())
    }
}

/// A private (decapsulation or signing) key tagged with its algorithm and kid.
#[derive(Clone)]
pub struct PrivateKeyMaterial {
    kid: KeyId,
    alg: String,
    bytes: SecretBytes,
}

impl PrivateKeyMaterial {
    pub fn new(kid: KeyId, alg: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            kid,
            alg: alg.into(),
            bytes: SecretBytes::new(bytes),
        }
    }

    pub fn kid(&self) -> &KeyId {
        &self.kid
    }

    pub fn alg(&self) -> &str {
        &self.alg
    }

    pub fn secret(&self) -> &SecretBytes {
        &self.bytes
    }
}

impl fmt::Debug for PrivateKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKeyMaterial")
            .field("kid", &self.kid)
            .field("alg", &self.alg)
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Public half plus private half of a freshly generated key.
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub public: RecipientKey,
    pub private: PrivateKeyMaterial,
}

impl KeyPair {
    pub fn kid(&self) -> &KeyId {
        self.public.kid()
    }
}

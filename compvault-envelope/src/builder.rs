//! Envelope construction and opening.

use crate::compression;
use crate::envelope::{Envelope, RecipientEntry, compute_aad};
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::header::{ProtectedHeader, RecipientHeader, ZIP_DEFLATE};
use compvault_crypto::alg::{ENC_XC20P, content_algorithm};
use compvault_crypto::{CryptoCapability, CryptoError, PrivateKeyMaterial, SecretBytes};
use compvault_types::{KeyId, RecipientKey, b64};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// HKDF info prefix for recipient key-encryption keys.
const WRAP_INFO: &[u8] = b"compvault/cek-wrap/v1";

/// The CEK is always wrapped with XChaCha20-Poly1305 regardless of `enc`.
const WRAP_ENC: &str = ENC_XC20P;
const WRAP_IV_LEN: usize = 24;
const WRAP_TAG_LEN: usize = 16;

/// Builds and opens multi-recipient envelopes through a [`CryptoCapability`].
#[derive(Clone)]
pub struct EnvelopeBuilder {
    capability: Arc<dyn CryptoCapability>,
    content_algorithm: String,
    compress: bool,
    typ: Option<String>,
    cty: Option<String>,
    unprotected: Option<serde_json::Map<String, serde_json::Value>>,
}

impl EnvelopeBuilder {
    /// XChaCha20-Poly1305 content encryption, no compression.
    pub fn new(capability: Arc<dyn CryptoCapability>) -> Self {
        Self {
            capability,
            content_algorithm: ENC_XC20P.to_string(),
            compress: false,
            typ: None,
            cty: None,
            unprotected: None,
        }
    }

    pub fn content_algorithm(mut self, enc: impl Into<String>) -> Self {
        self.content_algorithm = enc.into();
        self
    }

    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn typ(mut self, typ: impl Into<String>) -> Self {
        self.typ = Some(typ.into());
        self
    }

    pub fn cty(mut self, cty: impl Into<String>) -> Self {
        self.cty = Some(cty.into());
        self
    }

    pub fn unprotected(mut self, header: serde_json::Map<String, serde_json::Value>) -> Self {
        self.unprotected = Some(header);
        self
    }

    pub fn capability(&self) -> &Arc<dyn CryptoCapability> {
        &self.capability
    }

    /// Encrypts `plaintext` once for every key in `recipients`.
    ///
    /// Rejects an empty recipient list, kids containing `,`, and two keys
    /// that share a kid but differ in material, all before any key is
    /// generated.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        recipients: &[RecipientKey],
    ) -> EnvelopeResult<Envelope> {
        check_recipients(recipients)?;
        let enc = self.content_algorithm.as_str();
        let cap = self.capability.as_ref();

        let header = ProtectedHeader {
            enc: enc.to_string(),
            zip: self.compress.then(|| ZIP_DEFLATE.to_string()),
            typ: self.typ.clone(),
            cty: self.cty.clone(),
        };
        let protected = b64::encode(serde_json::to_vec(&header)?);

        let aad = compute_aad(&protected, recipients.iter().map(RecipientKey::kid));
        let aad_text = b64::encode(&aad);

        let cek = cap.generate_content_key(enc)?;
        let iv = cap.generate_iv(enc)?;

        let payload = if self.compress {
            compression::deflate(plaintext)?
        } else {
            plaintext.to_vec()
        };
        let content = cap.aead_encrypt(enc, &cek, &iv, aad_text.as_bytes(), &payload)?;

        let mut entries = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            entries.push(self.wrap_for(recipient, &cek, &aad, aad_text.as_bytes())?);
        }

        debug!(
            recipients = entries.len(),
            enc,
            compressed = self.compress,
            "built envelope"
        );

        Ok(Envelope {
            protected,
            unprotected: self.unprotected.clone(),
            recipients: entries,
            iv,
            ciphertext: content.ciphertext,
            tag: content.tag,
            aad: Some(aad),
        })
    }

    fn wrap_for(
        &self,
        recipient: &RecipientKey,
        cek: &SecretBytes,
        aad: &[u8],
        aad_text: &[u8],
    ) -> EnvelopeResult<RecipientEntry> {
        let cap = self.capability.as_ref();
        let encapsulation = cap.encapsulate(recipient)?;
        let kek = derive_kek(cap, &encapsulation.shared_secret, recipient.kid(), aad)?;
        let wrap_iv = cap.generate_iv(WRAP_ENC)?;
        let wrapped = cap.aead_encrypt(WRAP_ENC, &kek, &wrap_iv, aad_text, cek.expose_secret())?;

        let mut encrypted_key = encapsulation.encapsulated_key;
        encrypted_key.extend_from_slice(&wrap_iv);
        encrypted_key.extend_from_slice(&wrapped.ciphertext);
        encrypted_key.extend_from_slice(&wrapped.tag);

        Ok(RecipientEntry {
            encrypted_key,
            header: RecipientHeader {
                alg: recipient.alg().to_string(),
                kid: recipient.kid().clone(),
            },
        })
    }

    /// Opens `envelope` with the caller's private key.
    ///
    /// The kid lookup happens first, so a caller with no entry never causes a
    /// decapsulation. The binding digest is recomputed from the received
    /// header and kids and must match the stored `aad`.
    pub fn decrypt(
        &self,
        envelope: &Envelope,
        key: &PrivateKeyMaterial,
    ) -> EnvelopeResult<Vec<u8>> {
        let cap = self.capability.as_ref();
        let entry = envelope
            .recipient(key.kid())
            .ok_or_else(|| EnvelopeError::RecipientKeyNotFound(key.kid().clone()))?;

        let aad = envelope.expected_aad();
        if let Some(stored) = envelope.aad() {
            if stored != aad.as_slice() {
                warn!(kid = %key.kid(), "envelope aad mismatch");
                return Err(EnvelopeError::Integrity(
                    "aad does not match protected header and recipient set".into(),
                ));
            }
        }
        let aad_text = b64::encode(&aad);

        // Unauthenticated until the AEAD passes; a bad header is tampering.
        let header = envelope.header().map_err(|e| {
            warn!(kid = %key.kid(), error = %e, "undecodable protected header");
            EnvelopeError::Integrity("protected header does not decode".into())
        })?;
        let enc = header.enc.as_str();
        let cek_len = content_algorithm(enc)
            .map_err(|_| {
                EnvelopeError::Integrity(format!("protected header names unknown enc {enc:?}"))
            })?
            .key_len;

        let tail = WRAP_IV_LEN + cek_len + WRAP_TAG_LEN;
        let raw = entry.encrypted_key();
        if raw.len() <= tail {
            return Err(EnvelopeError::Malformed(format!(
                "encrypted_key too short ({} bytes)",
                raw.len()
            )));
        }
        let (encapsulated, wrap) = raw.split_at(raw.len() - tail);
        let (wrap_iv, wrap) = wrap.split_at(WRAP_IV_LEN);
        let (wrapped_cek, wrap_tag) = wrap.split_at(cek_len);

        let shared = cap.decapsulate(encapsulated, key)?;
        let kek = derive_kek(cap, &shared, key.kid(), &aad)?;
        let cek = cap
            .aead_decrypt(WRAP_ENC, &kek, wrap_iv, aad_text.as_bytes(), wrapped_cek, wrap_tag)
            .map_err(|e| integrity(e, "content key unwrap failed"))?;
        let cek = SecretBytes::new(cek);

        let payload = cap
            .aead_decrypt(
                enc,
                &cek,
                envelope.iv(),
                aad_text.as_bytes(),
                envelope.ciphertext(),
                envelope.tag(),
            )
            .map_err(|e| integrity(e, "content authentication failed"))?;

        let plaintext = match header.zip.as_deref() {
            None => payload,
            Some(ZIP_DEFLATE) => compression::inflate(&payload)?,
            Some(other) => {
                return Err(EnvelopeError::Malformed(format!("unsupported zip {other:?}")));
            }
        };
        debug!(kid = %key.kid(), "opened envelope");
        Ok(plaintext)
    }
}

fn check_recipients(recipients: &[RecipientKey]) -> EnvelopeResult<()> {
    if recipients.is_empty() {
        return Err(EnvelopeError::Configuration(
            "at least one recipient key is required".into(),
        ));
    }
    let mut seen: HashMap<&KeyId, &RecipientKey> = HashMap::new();
    for recipient in recipients {
        let kid = recipient.kid();
        if kid.as_str().is_empty() || kid.as_str().contains(',') {
            return Err(EnvelopeError::Configuration(format!(
                "invalid recipient kid {kid:?}"
            )));
        }
        if let Some(previous) = seen.insert(kid, recipient) {
            if previous != recipient {
                return Err(EnvelopeError::Configuration(format!(
                    "kid {kid} is shared by distinct keys"
                )));
            }
        }
    }
    Ok(())
}

fn derive_kek(
    cap: &dyn CryptoCapability,
    shared: &SecretBytes,
    kid: &KeyId,
    aad: &[u8],
) -> EnvelopeResult<SecretBytes> {
    let mut info = WRAP_INFO.to_vec();
    info.extend_from_slice(aad);
    Ok(cap.derive_key(shared, kid.as_str().as_bytes(), &info, 32)?)
}

/// Maps an authentication failure to an integrity error; other crypto errors pass through.
fn integrity(err: CryptoError, context: &str) -> EnvelopeError {
    match err {
        CryptoError::Authentication => EnvelopeError::Integrity(context.to_string()),
        other => EnvelopeError::Crypto(other),
    }
}

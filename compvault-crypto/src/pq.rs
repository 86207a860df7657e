//! Default post-quantum capability: ML-KEM-768, Dilithium-3, ChaCha20-Poly1305.

use crate::alg::{self, ENC_C20P, ENC_XC20P, KEM_ML_KEM_768, SIG_DILITHIUM3};
use crate::capability::{AeadOutput, CryptoCapability, Encapsulation};
use crate::error::{CryptoError, CryptoResult};
use crate::fingerprint::recipient_key;
use crate::material::{KeyPair, PrivateKeyMaterial, SecretBytes};
use chacha20poly1305::aead::{AeadInPlace, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Nonce, Tag, XChaCha20Poly1305, XNonce};
use compvault_types::RecipientKey;
use hkdf::Hkdf;
use ml_kem::kem::{Decapsulate, Encapsulate};
use ml_kem::{Ciphertext, EncodedSizeUser, KemCore, MlKem768};
use pqcrypto_dilithium::dilithium3 as dilithium;
use pqcrypto_traits::sign::{DetachedSignature as _, PublicKey as _, SecretKey as _};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;

type DecapsulationKey = <MlKem768 as KemCore>::DecapsulationKey;
type EncapsulationKey = <MlKem768 as KemCore>::EncapsulationKey;

/// Stateless post-quantum implementation of [`CryptoCapability`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PqCapability;

impl PqCapability {
    pub fn new() -> Self {
        Self
    }

    /// Generates an ML-KEM-768 recipient keypair with a fingerprint kid.
    pub fn generate_kem_keypair(&self) -> KeyPair {
        let (dk, ek) = MlKem768::generate(&mut OsRng);
        let public = recipient_key(KEM_ML_KEM_768, ek.as_bytes().to_vec());
        let private =
            PrivateKeyMaterial::new(public.kid().clone(), KEM_ML_KEM_768, dk.as_bytes().to_vec());
        KeyPair { public, private }
    }

    /// Generates a Dilithium-3 signing keypair with a fingerprint kid.
    pub fn generate_signing_keypair(&self) -> KeyPair {
        let (pk, sk) = dilithium::keypair();
        let public = recipient_key(SIG_DILITHIUM3, pk.as_bytes().to_vec());
        let private =
            PrivateKeyMaterial::new(public.kid().clone(), SIG_DILITHIUM3, sk.as_bytes().to_vec());
        KeyPair { public, private }
    }
}

fn require_alg(requested: Option<&str>, key_alg: &str, supported: &str) -> CryptoResult<()> {
    let alg = requested.unwrap_or(key_alg);
    if alg != supported || key_alg != supported {
        return Err(CryptoError::UnsupportedAlgorithm(alg.to_string()));
    }
    Ok(())
}

fn check_sizes(enc: &str, key: &SecretBytes, iv: &[u8]) -> CryptoResult<()> {
    let spec = alg::content_algorithm(enc)?;
    if key.len() != spec.key_len {
        return Err(CryptoError::InvalidKeyLength {
            expected: spec.key_len,
            actual: key.len(),
        });
    }
    if iv.len() != spec.iv_len {
        return Err(CryptoError::Malformed(format!(
            "{enc} expects a {}-byte IV, got {}",
            spec.iv_len,
            iv.len()
        )));
    }
    Ok(())
}

fn random_bytes(len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    OsRng.fill_bytes(&mut out);
    out
}

impl CryptoCapability for PqCapability {
    fn sign(
        &self,
        message: &[u8],
        key: &PrivateKeyMaterial,
        alg: Option<&str>,
    ) -> CryptoResult<Vec<u8>> {
        require_alg(alg, key.alg(), SIG_DILITHIUM3)
            .map_err(|e| CryptoError::Signature(e.to_string()))?;
        let sk = dilithium::SecretKey::from_bytes(key.secret().expose_secret())
            .map_err(|e| CryptoError::Signature(format!("invalid signing key: {e:?}")))?;
        let sig = dilithium::detached_sign(message, &sk);
        Ok(sig.as_bytes().to_vec())
    }

    fn verify(
        &self,
        message: &[u8],
        signature: &[u8],
        public_key: &RecipientKey,
        alg: Option<&str>,
    ) -> CryptoResult<bool> {
        require_alg(alg, public_key.alg(), SIG_DILITHIUM3)?;
        let pk = dilithium::PublicKey::from_bytes(public_key.public_key())
            .map_err(|e| CryptoError::Malformed(format!("verification key: {e:?}")))?;
        let sig = dilithium::DetachedSignature::from_bytes(signature)
            .map_err(|e| CryptoError::Malformed(format!("signature: {e:?}")))?;
        Ok(dilithium::verify_detached_signature(&sig, message, &pk).is_ok())
    }

    fn encapsulate(&self, recipient: &RecipientKey) -> CryptoResult<Encapsulation> {
        if recipient.alg() != KEM_ML_KEM_768 {
            return Err(CryptoError::UnsupportedAlgorithm(recipient.alg().to_string()));
        }
        let bytes = recipient.public_key();
        let ek = EncapsulationKey::from_bytes(&bytes.try_into().map_err(|_| {
            CryptoError::Encapsulation(format!(
                "invalid ML-KEM-768 public key length {}",
                bytes.len()
            ))
        })?);
        let (kem_ct, shared) = ek
            .encapsulate(&mut OsRng)
            .map_err(|_| CryptoError::Encapsulation("ML-KEM encapsulation failed".into()))?;
        Ok(Encapsulation {
            shared_secret: SecretBytes::new(shared.as_slice().to_vec()),
            encapsulated_key: kem_ct.as_slice().to_vec(),
        })
    }

    fn decapsulate(
        &self,
        encapsulated_key: &[u8],
        key: &PrivateKeyMaterial,
    ) -> CryptoResult<SecretBytes> {
        if key.alg() != KEM_ML_KEM_768 {
            return Err(CryptoError::UnsupportedAlgorithm(key.alg().to_string()));
        }
        let sk_bytes = key.secret().expose_secret();
        let dk = DecapsulationKey::from_bytes(&sk_bytes.try_into().map_err(|_| {
            CryptoError::Decapsulation(format!(
                "invalid ML-KEM-768 private key length {}",
                sk_bytes.len()
            ))
        })?);
        let kem_ct: Ciphertext<MlKem768> = encapsulated_key.try_into().map_err(|_| {
            CryptoError::Decapsulation(format!(
                "invalid ML-KEM-768 ciphertext length {}",
                encapsulated_key.len()
            ))
        })?;
        let shared = dk
            .decapsulate(&kem_ct)
            .map_err(|_| CryptoError::Decapsulation("ML-KEM decapsulation failed".into()))?;
        Ok(SecretBytes::new(shared.as_slice().to_vec()))
    }

    fn aead_encrypt(
        &self,
        enc: &str,
        key: &SecretBytes,
        iv: &[u8],
        aad: &[u8],
        plaintext: &[u8],
    ) -> CryptoResult<AeadOutput> {
        check_sizes(enc, key, iv)?;
        let mut buffer = plaintext.to_vec();
        let tag = match enc {
            ENC_XC20P => XChaCha20Poly1305::new_from_slice(key.expose_secret())
                .map_err(|e| CryptoError::Encryption(e.to_string()))?
                .encrypt_in_place_detached(XNonce::from_slice(iv), aad, &mut buffer),
            ENC_C20P => ChaCha20Poly1305::new_from_slice(key.expose_secret())
                .map_err(|e| CryptoError::Encryption(e.to_string()))?
                .encrypt_in_place_detached(Nonce::from_slice(iv), aad, &mut buffer),
            other => return Err(CryptoError::UnsupportedAlgorithm(other.to_string())),
        }
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        Ok(AeadOutput {
            ciphertext: buffer,
            tag: tag.to_vec(),
        })
    }

    fn aead_decrypt(
        &self,
        enc: &str,
        key: &SecretBytes,
        iv: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
    ) -> CryptoResult<Vec<u8>> {
        check_sizes(enc, key, iv)?;
        if tag.len() != 16 {
            return Err(CryptoError::Malformed(format!(
                "expected a 16-byte tag, got {}",
                tag.len()
            )));
        }
        let tag = Tag::from_slice(tag);
        let mut buffer = ciphertext.to_vec();
        match enc {
            ENC_XC20P => XChaCha20Poly1305::new_from_slice(key.expose_secret())
                .map_err(|e| CryptoError::Encryption(e.to_string()))?
                .decrypt_in_place_detached(XNonce::from_slice(iv), aad, &mut buffer, tag),
            ENC_C20P => ChaCha20Poly1305::new_from_slice(key.expose_secret())
                .map_err(|e| CryptoError::Encryption(e.to_string()))?
                .decrypt_in_place_detached(Nonce::from_slice(iv), aad, &mut buffer, tag),
            other => return Err(CryptoError::UnsupportedAlgorithm(other.to_string())),
        }
        .map_err(|_| CryptoError::Authentication)?;
        Ok(buffer)
    }

    fn generate_content_key(&self, enc: &str) -> CryptoResult<SecretBytes> {
        let spec = alg::content_algorithm(enc)?;
        Ok(SecretBytes::new(random_bytes(spec.key_len)))
    }

    fn generate_iv(&self, enc: &str) -> CryptoResult<Vec<u8>> {
        let spec = alg::content_algorithm(enc)?;
        Ok(random_bytes(spec.iv_len))
    }

    fn derive_key(
        &self,
        ikm: &SecretBytes,
        salt: &[u8],
        info: &[u8],
        len: usize,
    ) -> CryptoResult<SecretBytes> {
        let hk = Hkdf::<Sha256>::new(Some(salt), ikm.expose_secret());
        let mut okm = vec![0u8; len];
        hk.expand(info, &mut okm)
            .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
        Ok(SecretBytes::new(okm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kem_round_trip() {
        let cap = PqCapability::new();
        let kp = cap.generate_kem_keypair();
        let enc = cap.encapsulate(&kp.public).unwrap();
        let shared = cap.decapsulate(&enc.encapsulated_key, &kp.private).unwrap();
        assert_eq!(shared.expose_secret(), enc.shared_secret.expose_secret());
        assert_eq!(shared.len(), 32);
    }

    #[test]
    fn encapsulate_rejects_signature_key() {
        let cap = PqCapability::new();
        let kp = cap.generate_signing_keypair();
        assert!(matches!(
            cap.encapsulate(&kp.public),
            Err(CryptoError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn sign_with_kem_key_is_signature_error() {
        let cap = PqCapability::new();
        let kp = cap.generate_kem_keypair();
        assert!(matches!(
            cap.sign(b"msg", &kp.private, None),
            Err(CryptoError::Signature(_))
        ));
    }

    #[test]
    fn wrong_iv_length_is_malformed() {
        let cap = PqCapability::new();
        let key = cap.generate_content_key(ENC_XC20P).unwrap();
        let err = cap.aead_encrypt(ENC_XC20P, &key, &[0u8; 12], b"", b"x").unwrap_err();
        assert!(matches!(err, CryptoError::Malformed(_)));
    }
}

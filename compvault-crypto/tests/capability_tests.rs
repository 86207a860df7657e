use compvault_crypto::alg::{ENC_C20P, ENC_XC20P};
use compvault_crypto::{CryptoCapability, CryptoError, PqCapability, SecretBytes, key_fingerprint};

// ── Signatures ──

#[test]
fn sign_verify_roundtrip() {
    let cap = PqCapability::new();
    let kp = cap.generate_signing_keypair();

    let sig = cap.sign(b"composition payload", &kp.private, None).unwrap();
    assert!(cap.verify(b"composition payload", &sig, &kp.public, None).unwrap());
}

#[test]
fn invalid_signature_is_false_not_error() {
    let cap = PqCapability::new();
    let kp = cap.generate_signing_keypair();

    let mut sig = cap.sign(b"original", &kp.private, None).unwrap();
    assert!(!cap.verify(b"altered", &sig, &kp.public, None).unwrap());

    sig[10] ^= 0x01;
    assert!(!cap.verify(b"original", &sig, &kp.public, None).unwrap());
}

#[test]
fn signature_from_other_key_is_false() {
    let cap = PqCapability::new();
    let signer = cap.generate_signing_keypair();
    let other = cap.generate_signing_keypair();

    let sig = cap.sign(b"msg", &signer.private, None).unwrap();
    assert!(!cap.verify(b"msg", &sig, &other.public, None).unwrap());
}

#[test]
fn oversized_signature_is_malformed() {
    let cap = PqCapability::new();
    let kp = cap.generate_signing_keypair();
    let mut sig = cap.sign(b"msg", &kp.private, None).unwrap();
    sig.push(0);

    let err = cap.verify(b"msg", &sig, &kp.public, None).unwrap_err();
    assert!(matches!(err, CryptoError::Malformed(_)), "got {err:?}");
}

#[test]
fn unsupported_signature_alg_is_rejected() {
    let cap = PqCapability::new();
    let kp = cap.generate_signing_keypair();
    assert!(matches!(
        cap.sign(b"msg", &kp.private, Some("ES256")),
        Err(CryptoError::Signature(_))
    ));
}

// ── KEM ──

#[test]
fn kid_is_fingerprint_of_public_material() {
    let cap = PqCapability::new();
    let kp = cap.generate_kem_keypair();
    assert_eq!(kp.kid(), &key_fingerprint(kp.public.alg(), kp.public.public_key()));
    assert_eq!(kp.private.kid(), kp.kid());
}

#[test]
fn decapsulate_with_wrong_key_yields_different_secret() {
    let cap = PqCapability::new();
    let intended = cap.generate_kem_keypair();
    let wrong = cap.generate_kem_keypair();

    let enc = cap.encapsulate(&intended.public).unwrap();
    // ML-KEM decapsulation is implicit-rejection: no error, unrelated secret.
    let shared = cap.decapsulate(&enc.encapsulated_key, &wrong.private).unwrap();
    assert_ne!(shared.expose_secret(), enc.shared_secret.expose_secret());
}

#[test]
fn truncated_encapsulated_key_is_decapsulation_error() {
    let cap = PqCapability::new();
    let kp = cap.generate_kem_keypair();
    let enc = cap.encapsulate(&kp.public).unwrap();

    let err = cap
        .decapsulate(&enc.encapsulated_key[..100], &kp.private)
        .unwrap_err();
    assert!(matches!(err, CryptoError::Decapsulation(_)));
}

// ── AEAD ──

#[test]
fn aead_roundtrip_both_algorithms() {
    let cap = PqCapability::new();
    for enc in [ENC_XC20P, ENC_C20P] {
        let key = cap.generate_content_key(enc).unwrap();
        let iv = cap.generate_iv(enc).unwrap();
        let out = cap.aead_encrypt(enc, &key, &iv, b"aad", b"hello").unwrap();
        assert_eq!(out.tag.len(), 16);
        assert_eq!(out.ciphertext.len(), 5);
        let pt = cap
            .aead_decrypt(enc, &key, &iv, b"aad", &out.ciphertext, &out.tag)
            .unwrap();
        assert_eq!(pt, b"hello");
    }
}

#[test]
fn aead_detects_aad_and_tag_tampering() {
    let cap = PqCapability::new();
    let key = cap.generate_content_key(ENC_XC20P).unwrap();
    let iv = cap.generate_iv(ENC_XC20P).unwrap();
    let out = cap.aead_encrypt(ENC_XC20P, &key, &iv, b"aad", b"hello").unwrap();

    assert_eq!(
        cap.aead_decrypt(ENC_XC20P, &key, &iv, b"aae", &out.ciphertext, &out.tag),
        Err(CryptoError::Authentication)
    );

    let mut tag = out.tag.clone();
    tag[0] ^= 0x80;
    assert_eq!(
        cap.aead_decrypt(ENC_XC20P, &key, &iv, b"aad", &out.ciphertext, &tag),
        Err(CryptoError::Authentication)
    );
}

#[test]
fn aead_rejects_short_key() {
    let cap = PqCapability::new();
    let key = SecretBytes::new(vec![0u8; 16]);
    let err = cap
        .aead_encrypt(ENC_C20P, &key, &[0u8; 12], b"", b"x")
        .unwrap_err();
    assert_eq!(err, CryptoError::InvalidKeyLength { expected: 32, actual: 16 });
}

#[test]
fn derive_key_is_deterministic_and_info_bound() {
    let cap = PqCapability::new();
    let ikm = SecretBytes::new(vec![7u8; 32]);
    let a = cap.derive_key(&ikm, b"salt", b"info-a", 32).unwrap();
    let b = cap.derive_key(&ikm, b"salt", b"info-a", 32).unwrap();
    let c = cap.derive_key(&ikm, b"salt", b"info-b", 32).unwrap();
    assert_eq!(a.expose_secret(), b.expose_secret());
    assert_ne!(a.expose_secret(), c.expose_secret());
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn aead_always_roundtrips(
            plaintext in proptest::collection::vec(any::<u8>(), 0..512),
            aad in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            let cap = PqCapability::new();
            let key = cap.generate_content_key(ENC_XC20P).unwrap();
            let iv = cap.generate_iv(ENC_XC20P).unwrap();
            let out = cap.aead_encrypt(ENC_XC20P, &key, &iv, &aad, &plaintext).unwrap();
            let pt = cap
                .aead_decrypt(ENC_XC20P, &key, &iv, &aad, &out.ciphertext, &out.tag)
                .unwrap();
            prop_assert_eq!(pt, plaintext);
        }
    }
}

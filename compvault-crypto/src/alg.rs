//! Static algorithm tables. Nothing here is mutated at runtime.

use crate::error::{CryptoError, CryptoResult};

pub const KEM_ML_KEM_768: &str = "ML-KEM-768";
pub const SIG_DILITHIUM3: &str = "Dilithium3";
pub const ENC_XC20P: &str = "XC20P";
pub const ENC_C20P: &str = "C20P";

/// Sizes for one AEAD content algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentAlgorithm {
    pub id: &'static str,
    pub key_len: usize,
    pub iv_len: usize,
    pub tag_len: usize,
}

pub static CONTENT_ALGORITHMS: &[ContentAlgorithm] = &[
    ContentAlgorithm {
        id: ENC_XC20P,
        key_len: 32,
        iv_len: 24,
        tag_len: 16,
    },
    ContentAlgorithm {
        id: ENC_C20P,
        key_len: 32,
        iv_len: 12,
        tag_len: 16,
    },
];

pub fn content_algorithm(enc: &str) -> CryptoResult<&'static ContentAlgorithm> {
    CONTENT_ALGORITHMS
        .iter()
        .find(|a| a.id == enc)
        .ok_or_else(|| CryptoError::UnsupportedAlgorithm(enc.to_string()))
}

//! Cryptographic capability layer for the composition vault.
//!
//! The rest of the vault talks to cryptography only through the
//! [`CryptoCapability`] trait:
//! - sign / verify
//! - KEM encapsulate / decapsulate
//! - AEAD encrypt / decrypt with detached tags
//! - entropy for content keys and IVs, HKDF for key wrapping
//!
//! # Default suite
//!
//! [`PqCapability`] implements the trait with post-quantum primitives:
//!
//! 1. **KEM**: ML-KEM-768 (`alg = "ML-KEM-768"`), pure Rust.
//! 2. **Signatures**: Dilithium-3 (`alg = "Dilithium3"`).
//! 3. **Content encryption**: XChaCha20-Poly1305 (`"XC20P"`) or
//!    ChaCha20-Poly1305 (`"C20P"`).
//!
//! Other algorithm families can be plugged in by implementing the trait;
//! algorithm identifiers are opaque strings routed to the implementation.

pub mod alg;
mod capability;
mod error;
mod fingerprint;
mod material;
mod pq;

pub use capability::{AeadOutput, CryptoCapability, Encapsulation};
pub use error::{CryptoError, CryptoResult};
pub use fingerprint::{key_fingerprint, recipient_key};
pub use material::{KeyPair, PrivateKeyMaterial, SecretBytes};
pub use pq::PqCapability;

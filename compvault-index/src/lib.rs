//! Blind indexes over plaintext composition attributes.
//!
//! A token is `HMAC-SHA256(index_key, normalize(name) || 0x00 || normalize(value))`,
//! base64url-encoded. Tokens are deterministic under one [`IndexKey`] and carry
//! no decryption path. The index key is its own type so it cannot be mixed up
//! with content or signing keys.

mod builder;
mod error;
mod key;
mod normalize;
mod token;

pub use builder::{AttributeSource, BlindIndexBuilder};
pub use error::{IndexError, IndexResult};
pub use key::{INDEX_KEY_LEN, IndexKey};
pub use normalize::Normalization;
pub use token::{AttributeTokens, IndexToken, IndexTokenSet};

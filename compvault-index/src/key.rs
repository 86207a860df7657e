//! Secret key for blind index tokens.

use crate::error::{IndexError, IndexResult};
use rand::RngCore;
use rand::rngs::OsRng;
use std::fmt;
use zeroize::Zeroizing;

pub const INDEX_KEY_LEN: usize = 32;

/// HMAC key for index tokens. Zeroized on drop, never printed.
#[derive(Clone)]
pub struct IndexKey(Zeroizing<[u8; INDEX_KEY_LEN]>);

impl IndexKey {
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new([0u8; INDEX_KEY_LEN]);
        OsRng.fill_bytes(bytes.as_mut());
        Self(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> IndexResult<Self> {
        let array: [u8; INDEX_KEY_LEN] = bytes.try_into().map_err(|_| IndexError::InvalidKey {
            expected: INDEX_KEY_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(Zeroizing::new(array)))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl fmt::Debug for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IndexKey([REDACTED])")
    }
}

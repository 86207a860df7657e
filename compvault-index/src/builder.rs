use crate::error::{IndexError, IndexResult};
use crate::key::IndexKey;
use crate::normalize::Normalization;
use crate::token::{IndexToken, IndexTokenSet};
use compvault_types::b64;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Anything that can report plaintext values for a named attribute.
///
/// An attribute with no value yields an empty list; it is not an error.
pub trait AttributeSource {
    fn attribute_values(&self, name: &str) -> Vec<String>;
}

impl AttributeSource for HashMap<String, Vec<String>> {
    fn attribute_values(&self, name: &str) -> Vec<String> {
        self.get(name).cloned().unwrap_or_default()
    }
}

impl AttributeSource for BTreeMap<String, Vec<String>> {
    fn attribute_values(&self, name: &str) -> Vec<String> {
        self.get(name).cloned().unwrap_or_default()
    }
}

/// Derives blind index tokens under one secret key and normalization policy.
#[derive(Debug, Clone)]
pub struct BlindIndexBuilder {
    key: IndexKey,
    normalization: Normalization,
}

impl BlindIndexBuilder {
    pub fn new(key: IndexKey) -> Self {
        Self {
            key,
            normalization: Normalization::default(),
        }
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    pub fn build_index(&self, name: &str, value: &str) -> IndexResult<IndexToken> {
        let name = self.normalization.apply(name);
        if name.is_empty() {
            return Err(IndexError::EmptyAttributeName);
        }
        let value = self.normalization.apply(value);

        // new_from_slice only fails for fixed-size-key MACs; HMAC takes any length.
        let mut mac = <HmacSha256 as Mac>::new_from_slice(self.key.as_bytes())
            .map_err(|_| IndexError::InvalidKey {
                expected: crate::key::INDEX_KEY_LEN,
                actual: self.key.as_bytes().len(),
            })?;
        mac.update(name.as_bytes());
        mac.update(&[0u8]);
        mac.update(value.as_bytes());
        Ok(IndexToken::new(b64::encode(mac.finalize().into_bytes())))
    }

    /// Tokens for every declared attribute the source has values for.
    ///
    /// Values that normalize to the empty string are skipped.
    pub fn build_all<S: AttributeSource + ?Sized>(
        &self,
        unique: &[String],
        non_unique: &[String],
        source: &S,
    ) -> IndexResult<IndexTokenSet> {
        let mut set = IndexTokenSet::new();
        for (names, is_unique) in [(unique, true), (non_unique, false)] {
            for name in names {
                if name.trim().is_empty() {
                    return Err(IndexError::EmptyAttributeName);
                }
                for value in source.attribute_values(name) {
                    if self.normalization.apply(&value).is_empty() {
                        continue;
                    }
                    set.insert(name, self.build_index(name, &value)?, is_unique);
                }
            }
        }
        debug!(
            unique = set.unique_tokens().count(),
            non_unique = set.non_unique_tokens().count(),
            "built index token set"
        );
        Ok(set)
    }
}

//! Index tokens and the per-attribute token set stored beside an envelope.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque base64url digest. Carries nothing recoverable about its input.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexToken(String);

impl IndexToken {
    pub(crate) fn new(encoded: String) -> Self {
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IndexToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tokens for one declared attribute, split by uniqueness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeTokens {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unique_tokens: Vec<IndexToken>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_unique_tokens: Vec<IndexToken>,
}

/// Every token derived for one composition write, keyed by attribute name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexTokenSet {
    attributes: BTreeMap<String, AttributeTokens>,
}

impl IndexTokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a token, ignoring exact repeats within the same partition.
    pub fn insert(&mut self, attribute: &str, token: IndexToken, unique: bool) {
        let entry = self.attributes.entry(attribute.to_string()).or_default();
        let list = if unique {
            &mut entry.unique_tokens
        } else {
            &mut entry.non_unique_tokens
        };
        if let Err(pos) = list.binary_search(&token) {
            list.insert(pos, token);
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeTokens> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttributeTokens)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// `(attribute, token)` for every unique token.
    pub fn unique_tokens(&self) -> impl Iterator<Item = (&str, &IndexToken)> {
        self.attributes
            .iter()
            .flat_map(|(name, t)| t.unique_tokens.iter().map(move |tok| (name.as_str(), tok)))
    }

    /// `(attribute, token)` for every non-unique token.
    pub fn non_unique_tokens(&self) -> impl Iterator<Item = (&str, &IndexToken)> {
        self.attributes
            .iter()
            .flat_map(|(name, t)| t.non_unique_tokens.iter().map(move |tok| (name.as_str(), tok)))
    }

    pub fn contains(&self, token: &IndexToken) -> bool {
        self.attributes
            .values()
            .any(|t| t.unique_tokens.contains(token) || t.non_unique_tokens.contains(token))
    }

    pub fn token_count(&self) -> usize {
        self.attributes
            .values()
            .map(|t| t.unique_tokens.len() + t.non_unique_tokens.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.token_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(s: &str) -> IndexToken {
        IndexToken::new(s.to_string())
    }

    #[test]
    fn insert_dedups_and_partitions() {
        let mut set = IndexTokenSet::new();
        set.insert("identifier", tok("b"), true);
        set.insert("identifier", tok("a"), true);
        set.insert("identifier", tok("b"), true);
        set.insert("title", tok("c"), false);

        assert_eq!(set.token_count(), 3);
        assert_eq!(
            set.attribute("identifier").unwrap().unique_tokens,
            vec![tok("a"), tok("b")]
        );
        assert_eq!(set.unique_tokens().count(), 2);
        assert_eq!(set.non_unique_tokens().collect::<Vec<_>>(), vec![("title", &tok("c"))]);
        assert!(set.contains(&tok("c")));
        assert!(!set.contains(&tok("d")));
    }

    #[test]
    fn serializes_as_attribute_map() {
        let mut set = IndexTokenSet::new();
        set.insert("identifier", tok("x"), true);
        set.insert("title", tok("y"), false);
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "identifier": { "uniqueTokens": ["x"] },
                "title": { "nonUniqueTokens": ["y"] }
            })
        );
    }
}

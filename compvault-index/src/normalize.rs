use serde::{Deserialize, Serialize};

/// Canonicalization applied to attribute names and values before hashing.
///
/// Fixed per deployment: changing it orphans every stored token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Normalization {
    pub trim: bool,
    pub case_fold: bool,
}

impl Default for Normalization {
    fn default() -> Self {
        Self {
            trim: true,
            case_fold: true,
        }
    }
}

impl Normalization {
    pub fn apply(&self, input: &str) -> String {
        let s = if self.trim { input.trim() } else { input };
        if self.case_fold {
            s.to_lowercase()
        } else {
            s.to_string()
        }
    }
}

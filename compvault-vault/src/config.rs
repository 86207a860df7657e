//! Vault configuration.

use crate::error::{VaultError, VaultResult};
use compvault_index::Normalization;
use serde::{Deserialize, Serialize};

/// Runtime settings. Keys are never part of configuration; they are handed
/// to [`crate::VaultOrchestrator::builder`] directly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// AEAD identifier for content encryption (`"XC20P"` or `"C20P"` with the default capability).
    pub content_algorithm: String,

    /// Deflate payloads before encryption.
    pub compress: bool,

    /// Canonicalization for blind index inputs. Must not change once tokens are stored.
    pub normalization: Normalization,

    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Collection used when a write or read names none.
    pub default_collection: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            content_algorithm: "XC20P".to_string(),
            compress: false,
            normalization: Normalization::default(),
            log_filter: "info".to_string(),
            default_collection: "compositions".to_string(),
        }
    }
}

impl VaultConfig {
    pub fn from_json_str(json: &str) -> VaultResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| VaultError::Configuration(format!("vault config: {e}")))
    }

    /// Defaults overridden by `COMPVAULT_ENC`, `COMPVAULT_COMPRESS`,
    /// `COMPVAULT_LOG` and `COMPVAULT_COLLECTION`.
    pub fn from_env() -> VaultResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Self::from_env`] with an arbitrary variable source. Blank values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> VaultResult<Self> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(enc) = get("COMPVAULT_ENC") {
            config.content_algorithm = enc;
        }
        if let Some(raw) = get("COMPVAULT_COMPRESS") {
            config.compress = match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(VaultError::Configuration(format!(
                        "COMPVAULT_COMPRESS must be a boolean, got {raw:?}"
                    )));
                }
            };
        }
        if let Some(filter) = get("COMPVAULT_LOG") {
            config.log_filter = filter;
        }
        if let Some(collection) = get("COMPVAULT_COLLECTION") {
            config.default_collection = collection;
        }
        Ok(config)
    }
}

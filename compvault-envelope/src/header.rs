//! Protected and per-recipient headers.

use compvault_types::KeyId;
use serde::{Deserialize, Serialize};

pub const PLAIN_TYP: &str = "application/didcomm-plain+json";
pub const SIGNED_TYP: &str = "application/didcomm-signed+json";
pub const ENCRYPTED_TYP: &str = "application/didcomm-encrypted+json";

/// The only compression scheme understood for `zip`.
pub const ZIP_DEFLATE: &str = "DEF";

/// Integrity-protected envelope header. Serialized once, base64url-encoded,
/// and bound into `aad` exactly as transmitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedHeader {
    pub enc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientHeader {
    pub alg: String,
    pub kid: KeyId,
}

use chrono::{DateTime, Utc};
use compvault_envelope::Envelope;
use compvault_index::IndexTokenSet;
use serde::{Deserialize, Serialize};

/// What a stored record carries. The `mode` tag keeps plaintext records
/// from ever being read as ciphertext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RecordPayload {
    Encrypted { envelope: Envelope },
    /// Compact signed token over the plaintext, not encrypted.
    Signed { token: String },
    /// Draft or local-only compositions written without recipients.
    Unencrypted { plaintext: serde_json::Value },
}

impl RecordPayload {
    pub fn is_encrypted(&self) -> bool {
        matches!(self, RecordPayload::Encrypted { .. })
    }

    pub fn mode(&self) -> &'static str {
        match self {
            RecordPayload::Encrypted { .. } => "encrypted",
            RecordPayload::Signed { .. } => "signed",
            RecordPayload::Unencrypted { .. } => "unencrypted",
        }
    }
}

/// The persisted unit: payload plus the index tokens derived for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecureStorageRecord {
    pub id: String,
    #[serde(flatten)]
    pub payload: RecordPayload,
    pub indexed: IndexTokenSet,
    pub created_at: DateTime<Utc>,
}

impl SecureStorageRecord {
    /// New record with a time-ordered id.
    pub fn new(payload: RecordPayload, indexed: IndexTokenSet) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            payload,
            indexed,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

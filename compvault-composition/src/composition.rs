use chrono::{DateTime, Utc};
use compvault_types::{Resource, Role, Status};
use serde::{Deserialize, Serialize};

/// Composition metadata and its resources, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub author: String,
    pub subject: String,
    pub date: DateTime<Utc>,
    pub status: Status,
    pub title: String,
    pub identifier: String,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub meta: serde_json::Map<String, serde_json::Value>,
    /// Client-side hint only; never enforced here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl Composition {
    /// Draft composition dated now with a `urn:uuid:` identifier.
    pub fn new(
        author: impl Into<String>,
        subject: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            subject: subject.into(),
            date: Utc::now(),
            status: Status::Draft,
            title: title.into(),
            identifier: format!("urn:uuid:{}", uuid::Uuid::new_v4()),
            resources: Vec::new(),
            meta: serde_json::Map::new(),
            role: None,
        }
    }
}

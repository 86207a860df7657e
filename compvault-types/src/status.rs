//! Composition status and advisory client-side roles.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a composition: `draft`, `final`, or a lexically
/// valid extension such as `amended` or `entered-in-error`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Status {
    Draft,
    Final,
    Extension(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::Draft => "draft",
            Status::Final => "final",
            Status::Extension(value) => value,
        }
    }
}

/// Extension codes are lowercase ASCII words joined by single hyphens.
fn is_valid_extension(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    if value.ends_with('-') || value.contains("--") {
        return false;
    }
    value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

impl FromStr for Status {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Status::Draft),
            "final" => Ok(Status::Final),
            other if is_valid_extension(other) => Ok(Status::Extension(other.to_string())),
            other => Err(TypesError::InvalidStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for Status {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Status> for String {
    fn from(value: Status) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-side role hint. Authority checks belong to the backend; nothing
/// in the vault enforces these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Editor,
    Owner,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Viewer => write!(f, "viewer"),
            Role::Editor => write!(f, "editor"),
            Role::Owner => write!(f, "owner"),
        }
    }
}

impl FromStr for Role {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewer" => Ok(Role::Viewer),
            "editor" => Ok(Role::Editor),
            "owner" => Ok(Role::Owner),
            other => Err(TypesError::InvalidRole(other.to_string())),
        }
    }
}

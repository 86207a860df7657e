use crate::composition::Composition;
use crate::error::{CompositionError, CompositionResult};
use crate::format;
use chrono::{DateTime, SecondsFormat, Utc};
use compvault_index::AttributeSource;
use compvault_types::{Resource, Role, Status};
use std::collections::HashSet;
use tracing::{debug, info};

/// Owns one [`Composition`] and keeps its resource identifiers unique.
#[derive(Debug, Clone)]
pub struct CompositionManager {
    composition: Composition,
}

impl CompositionManager {
    pub fn new(
        author: impl Into<String>,
        subject: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            composition: Composition::new(author, subject, title),
        }
    }

    /// Adopts an existing composition, e.g. one decoded from storage.
    pub fn from_composition(composition: Composition) -> CompositionResult<Self> {
        let mut seen = HashSet::new();
        for r in &composition.resources {
            if !seen.insert(r.identifier.as_str()) {
                return Err(CompositionError::DuplicateResource(r.identifier.clone()));
            }
        }
        Ok(Self { composition })
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn into_composition(self) -> Composition {
        self.composition
    }

    // ── Resources ──

    /// Creates and appends a resource. Without an identifier a `urn:uuid:` one is minted.
    pub fn create_resource(
        &mut self,
        resource_type: &str,
        subject: &str,
        identifier: Option<&str>,
    ) -> CompositionResult<&mut Resource> {
        if resource_type.is_empty() {
            return Err(CompositionError::Invalid("resource type is empty".into()));
        }
        let identifier = match identifier {
            Some(id) => id.to_string(),
            None => format!("urn:uuid:{}", uuid::Uuid::new_v4()),
        };
        if self.load_resource(&identifier).is_some() {
            return Err(CompositionError::DuplicateResource(identifier));
        }
        debug!(resource_type, identifier = %identifier, "created resource");
        self.composition
            .resources
            .push(Resource::new(resource_type, subject, identifier));
        let last = self.composition.resources.len() - 1;
        Ok(&mut self.composition.resources[last])
    }

    /// `None` when no resource has this identifier.
    pub fn load_resource(&self, identifier: &str) -> Option<&Resource> {
        self.composition
            .resources
            .iter()
            .find(|r| r.identifier == identifier)
    }

    /// Replaces the resource with the same identifier in place, or appends it.
    pub fn save_resource(&mut self, resource: Resource) {
        match self
            .composition
            .resources
            .iter_mut()
            .find(|r| r.identifier == resource.identifier)
        {
            Some(existing) => *existing = resource,
            None => self.composition.resources.push(resource),
        }
    }

    pub fn remove_resource(&mut self, identifier: &str) -> Option<Resource> {
        let pos = self
            .composition
            .resources
            .iter()
            .position(|r| r.identifier == identifier)?;
        Some(self.composition.resources.remove(pos))
    }

    pub fn resources(&self) -> &[Resource] {
        &self.composition.resources
    }

    pub fn get_resources_by_type(&self, resource_type: &str) -> Vec<&Resource> {
        self.composition
            .resources
            .iter()
            .filter(|r| r.resource_type == resource_type)
            .collect()
    }

    // ── Fields ──

    pub fn author(&self) -> &str {
        &self.composition.author
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.composition.author = author.into();
    }

    pub fn subject(&self) -> &str {
        &self.composition.subject
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.composition.subject = subject.into();
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.composition.date
    }

    pub fn set_date(&mut self, date: DateTime<Utc>) {
        self.composition.date = date;
    }

    pub fn status(&self) -> &Status {
        &self.composition.status
    }

    /// Rejects lexically invalid values and leaves the current status untouched.
    pub fn set_status(&mut self, status: &str) -> CompositionResult<()> {
        let status: Status = status.parse()?;
        info!(identifier = %self.composition.identifier, status = %status, "status changed");
        self.composition.status = status;
        Ok(())
    }

    pub fn title(&self) -> &str {
        &self.composition.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.composition.title = title.into();
    }

    pub fn identifier(&self) -> &str {
        &self.composition.identifier
    }

    pub fn set_identifier(&mut self, identifier: impl Into<String>) {
        self.composition.identifier = identifier.into();
    }

    pub fn meta(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.composition.meta
    }

    pub fn set_meta(&mut self, meta: serde_json::Map<String, serde_json::Value>) {
        self.composition.meta = meta;
    }

    pub fn role(&self) -> Option<Role> {
        self.composition.role
    }

    /// Records the caller's role as a client-side hint.
    ///
    /// Nothing in the vault checks it; authorization belongs to the backend.
    pub fn set_role(&mut self, role: Role) {
        self.composition.role = Some(role);
    }

    // ── Output ──

    /// Maps every resource through the named format, in order. No side effects.
    pub fn to_specification(&self, name: &str) -> CompositionResult<Vec<serde_json::Value>> {
        let map = format::mapper(name)?;
        self.composition.resources.iter().map(map).collect()
    }

    /// Plaintext values for an indexable attribute.
    ///
    /// Composition fields are addressed by name (`author`, `subject`, `title`,
    /// `identifier`, `status`, `date`). `Type.name` addresses a parameter, or
    /// failing that the `identifier`/`subject`/`fullUrl` field, of every
    /// resource of that type. Unknown names yield nothing.
    pub fn attribute_values(&self, name: &str) -> Vec<String> {
        let c = &self.composition;
        let values = match name {
            "author" => vec![c.author.clone()],
            "subject" => vec![c.subject.clone()],
            "title" => vec![c.title.clone()],
            "identifier" => vec![c.identifier.clone()],
            "status" => vec![c.status.as_str().to_string()],
            "date" => vec![c.date.to_rfc3339_opts(SecondsFormat::Secs, true)],
            path => match path.split_once('.') {
                Some((resource_type, field)) => self
                    .get_resources_by_type(resource_type)
                    .into_iter()
                    .filter_map(|r| resource_value(r, field))
                    .collect(),
                None => Vec::new(),
            },
        };
        values.into_iter().filter(|v| !v.is_empty()).collect()
    }
}

fn resource_value(resource: &Resource, field: &str) -> Option<String> {
    if let Some(value) = resource.parameter(field) {
        return Some(value.search_text());
    }
    match field {
        "identifier" => Some(resource.identifier.clone()),
        "subject" => Some(resource.subject.clone()),
        "fullUrl" => resource.full_url.clone(),
        _ => None,
    }
}

impl AttributeSource for CompositionManager {
    fn attribute_values(&self, name: &str) -> Vec<String> {
        CompositionManager::attribute_values(self, name)
    }
}

//! Resources and their typed search parameters.

use crate::error::{TypesError, TypesResult};
use serde::{Deserialize, Serialize};

/// Typed parameter value carried by a [`Resource`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ParameterValue {
    Number(f64),
    /// ISO-8601 date or date-time; partial dates (`2024`, `2024-05`) are allowed.
    Date(String),
    String(String),
    Token {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        system: Option<String>,
        code: String,
    },
    Reference(String),
    Composite(Vec<Parameter>),
    Quantity {
        value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        system: Option<String>,
    },
    Uri(String),
    Period {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end: Option<String>,
    },
}

impl ParameterValue {
    /// Canonical text form used for equality search.
    ///
    /// Tokens render as `system|code`, quantities as `value|unit`, periods as
    /// `start/end`, composites as their components joined with `$`.
    pub fn search_text(&self) -> String {
        match self {
            ParameterValue::Number(n) => n.to_string(),
            ParameterValue::Date(s)
            | ParameterValue::String(s)
            | ParameterValue::Reference(s)
            | ParameterValue::Uri(s) => s.clone(),
            ParameterValue::Token { system, code } => match system {
                Some(system) => format!("{system}|{code}"),
                None => code.clone(),
            },
            ParameterValue::Quantity { value, unit, .. } => match unit {
                Some(unit) => format!("{value}|{unit}"),
                None => value.to_string(),
            },
            ParameterValue::Period { start, end } => format!(
                "{}/{}",
                start.as_deref().unwrap_or_default(),
                end.as_deref().unwrap_or_default()
            ),
            ParameterValue::Composite(parts) => parts
                .iter()
                .map(|p| p.value.search_text())
                .collect::<Vec<_>>()
                .join("$"),
        }
    }
}

/// Named parameter; names are unique within one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: ParameterValue,
}

/// An application-level record owned by a composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ResourceRepr")]
pub struct Resource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub subject: String,
    pub identifier: String,
    #[serde(rename = "fullUrl", default, skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,
    #[serde(default)]
    pub meta: serde_json::Map<String, serde_json::Value>,
    parameters: Vec<Parameter>,
}

impl Resource {
    pub fn new(
        resource_type: impl Into<String>,
        subject: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            subject: subject.into(),
            identifier: identifier.into(),
            full_url: None,
            meta: serde_json::Map::new(),
            parameters: Vec::new(),
        }
    }

    pub fn with_full_url(mut self, url: impl Into<String>) -> Self {
        self.full_url = Some(url.into());
        self
    }

    /// Adds a parameter, rejecting a name that is already present.
    pub fn add_parameter(
        &mut self,
        name: impl Into<String>,
        value: ParameterValue,
    ) -> TypesResult<()> {
        let name = name.into();
        if self.parameter(&name).is_some() {
            return Err(TypesError::DuplicateParameter(name));
        }
        self.parameters.push(Parameter { name, value });
        Ok(())
    }

    /// Inserts or replaces a parameter, keeping its original position on replace.
    pub fn set_parameter(&mut self, name: impl Into<String>, value: ParameterValue) {
        let name = name.into();
        match self.parameters.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.value = value,
            None => self.parameters.push(Parameter { name, value }),
        }
    }

    pub fn remove_parameter(&mut self, name: &str) -> Option<ParameterValue> {
        let pos = self.parameters.iter().position(|p| p.name == name)?;
        Some(self.parameters.remove(pos).value)
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterValue> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

#[derive(Deserialize)]
struct ResourceRepr {
    #[serde(rename = "type")]
    resource_type: String,
    subject: String,
    identifier: String,
    #[serde(rename = "fullUrl", default)]
    full_url: Option<String>,
    #[serde(default)]
    meta: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    parameters: Vec<Parameter>,
}

impl TryFrom<ResourceRepr> for Resource {
    type Error = TypesError;

    fn try_from(repr: ResourceRepr) -> Result<Self, Self::Error> {
        if repr.resource_type.is_empty() {
            return Err(TypesError::EmptyField("type"));
        }
        let mut resource = Resource::new(repr.resource_type, repr.subject, repr.identifier);
        resource.full_url = repr.full_url;
        resource.meta = repr.meta;
        for p in repr.parameters {
            resource.add_parameter(p.name, p.value)?;
        }
        Ok(resource)
    }
}

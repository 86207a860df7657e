//! Output formats a composition can be serialized into.

use crate::error::{CompositionError, CompositionResult};
use compvault_types::{Parameter, ParameterValue, Resource};
use serde_json::{Map, Value, json};

pub const FHIR: &str = "fhir";
pub const NATIVE: &str = "native";

type Mapper = fn(&Resource) -> CompositionResult<Value>;

static FORMATS: &[(&str, Mapper)] = &[(FHIR, fhir_resource), (NATIVE, native_resource)];

pub fn supported_formats() -> impl Iterator<Item = &'static str> {
    FORMATS.iter().map(|(name, _)| *name)
}

pub(crate) fn mapper(name: &str) -> CompositionResult<Mapper> {
    FORMATS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, m)| *m)
        .ok_or_else(|| CompositionError::UnknownSpecification(name.to_string()))
}

fn native_resource(resource: &Resource) -> CompositionResult<Value> {
    Ok(serde_json::to_value(resource)?)
}

/// FHIR-style JSON. Parameters become top-level elements; the core fields
/// are written last and win over a parameter of the same name.
fn fhir_resource(resource: &Resource) -> CompositionResult<Value> {
    let mut out = Map::new();
    for Parameter { name, value } in resource.parameters() {
        out.insert(name.clone(), fhir_value(value));
    }
    out.insert("resourceType".into(), Value::String(resource.resource_type.clone()));
    out.insert("id".into(), Value::String(resource.identifier.clone()));
    out.insert("subject".into(), json!({ "reference": resource.subject }));
    if let Some(url) = &resource.full_url {
        out.insert("fullUrl".into(), Value::String(url.clone()));
    }
    if !resource.meta.is_empty() {
        out.insert("meta".into(), Value::Object(resource.meta.clone()));
    }
    Ok(Value::Object(out))
}

fn fhir_value(value: &ParameterValue) -> Value {
    match value {
        ParameterValue::Number(n) => json!(n),
        ParameterValue::Date(s) | ParameterValue::String(s) | ParameterValue::Uri(s) => {
            Value::String(s.clone())
        }
        ParameterValue::Token { system, code } => {
            let mut coding = Map::new();
            if let Some(system) = system {
                coding.insert("system".into(), Value::String(system.clone()));
            }
            coding.insert("code".into(), Value::String(code.clone()));
            json!({ "coding": [coding] })
        }
        ParameterValue::Reference(r) => json!({ "reference": r }),
        ParameterValue::Quantity {
            value,
            unit,
            system,
        } => {
            let mut q = Map::new();
            q.insert("value".into(), json!(value));
            if let Some(unit) = unit {
                q.insert("unit".into(), Value::String(unit.clone()));
            }
            if let Some(system) = system {
                q.insert("system".into(), Value::String(system.clone()));
            }
            Value::Object(q)
        }
        ParameterValue::Period { start, end } => {
            let mut p = Map::new();
            if let Some(start) = start {
                p.insert("start".into(), Value::String(start.clone()));
            }
            if let Some(end) = end {
                p.insert("end".into(), Value::String(end.clone()));
            }
            Value::Object(p)
        }
        ParameterValue::Composite(parts) => Value::Object(
            parts
                .iter()
                .map(|p| (p.name.clone(), fhir_value(&p.value)))
                .collect(),
        ),
    }
}

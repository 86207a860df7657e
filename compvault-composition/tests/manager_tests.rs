use chrono::{TimeZone, Utc};
use compvault_composition::{CompositionError, CompositionManager, FHIR, NATIVE};
use compvault_index::AttributeSource;
use compvault_types::{ParameterValue, Resource, Role, Status};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

fn lab_composition() -> CompositionManager {
    let mut m = CompositionManager::new("Practitioner/dr-who", "Patient/p-1", "Lab results");
    m.set_identifier("comp-42");
    m.set_date(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap());

    let obs = m
        .create_resource("Observation", "urn:uuid:1234", Some("obs-1"))
        .unwrap();
    obs.add_parameter(
        "code",
        ParameterValue::Token {
            system: Some("http://loinc.org".into()),
            code: "2345-7".into(),
        },
    )
    .unwrap();
    obs.add_parameter("effective", ParameterValue::Date("2024-05-01".into()))
        .unwrap();

    m.create_resource("Condition", "urn:uuid:1234", Some("cond-1"))
        .unwrap();
    m
}

#[test]
fn to_specification_is_pure() {
    let m = lab_composition();
    let first = m.to_specification(FHIR).unwrap();
    let second = m.to_specification(FHIR).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(first[0]["resourceType"], "Observation");
    assert_eq!(first[0]["subject"], json!({"reference": "urn:uuid:1234"}));
}

#[test]
fn native_format_is_resource_serde_form() {
    let m = lab_composition();
    let native = m.to_specification(NATIVE).unwrap();
    let back: Resource = serde_json::from_value(native[0].clone()).unwrap();
    assert_eq!(Some(&back), m.load_resource("obs-1"));
}

#[test]
fn unknown_output_format() {
    assert!(matches!(
        lab_composition().to_specification("cda"),
        Err(CompositionError::UnknownSpecification(_))
    ));
}

#[test]
fn load_missing_is_none() {
    assert!(lab_composition().load_resource("nope").is_none());
}

#[test]
fn generated_identifiers_are_urns() {
    let mut m = CompositionManager::new("a", "s", "t");
    let id = m
        .create_resource("Observation", "urn:uuid:1234", None)
        .unwrap()
        .identifier
        .clone();
    assert!(id.starts_with("urn:uuid:"));
    assert!(m.load_resource(&id).is_some());
}

#[test]
fn save_replaces_in_place() {
    let mut m = lab_composition();
    let mut updated = m.load_resource("obs-1").unwrap().clone();
    updated.set_parameter("effective", ParameterValue::Date("2024-06-01".into()));
    m.save_resource(updated);

    assert_eq!(m.resources().len(), 2);
    assert_eq!(m.resources()[0].identifier, "obs-1");
    assert_eq!(
        m.load_resource("obs-1").unwrap().parameter("effective"),
        Some(&ParameterValue::Date("2024-06-01".into()))
    );

    m.save_resource(Resource::new("Observation", "urn:uuid:1234", "obs-2"));
    assert_eq!(m.get_resources_by_type("Observation").len(), 2);
}

#[test]
fn remove_resource() {
    let mut m = lab_composition();
    assert_eq!(m.remove_resource("cond-1").unwrap().resource_type, "Condition");
    assert!(m.remove_resource("cond-1").is_none());
    assert!(m.get_resources_by_type("Condition").is_empty());
}

#[test]
fn field_setters() {
    let mut m = lab_composition();
    m.set_author("Practitioner/other");
    m.set_subject("Patient/p-2");
    m.set_title("Updated");
    m.set_status("amended").unwrap();
    let mut meta = serde_json::Map::new();
    meta.insert("versionId".into(), json!("2"));
    m.set_meta(meta.clone());

    assert_eq!(m.author(), "Practitioner/other");
    assert_eq!(m.subject(), "Patient/p-2");
    assert_eq!(m.title(), "Updated");
    assert_eq!(m.status(), &Status::Extension("amended".into()));
    assert_eq!(m.meta(), &meta);
}

#[test]
fn role_is_recorded_but_not_enforced() {
    let mut m = lab_composition();
    m.set_role(Role::Viewer);
    assert_eq!(m.role(), Some(Role::Viewer));
    // A viewer can still mutate; authority lives outside the vault.
    m.set_title("still writable");
    assert_eq!(m.title(), "still writable");
}

#[test]
fn attribute_values_cover_fields_and_parameters() {
    let m = lab_composition();
    assert_eq!(m.attribute_values("identifier"), vec!["comp-42"]);
    assert_eq!(m.attribute_values("status"), vec!["draft"]);
    assert_eq!(m.attribute_values("date"), vec!["2024-05-01T09:30:00Z"]);
    assert_eq!(
        m.attribute_values("Observation.code"),
        vec!["http://loinc.org|2345-7"]
    );
    assert_eq!(
        m.attribute_values("Condition.identifier"),
        vec!["cond-1"]
    );
    assert!(m.attribute_values("Observation.missing").is_empty());
    assert!(m.attribute_values("unknown").is_empty());

    let source: &dyn AttributeSource = &m;
    assert_eq!(source.attribute_values("title"), vec!["Lab results"]);
}

proptest! {
    #[test]
    fn repeated_serialization_matches(
        types in proptest::collection::vec("[A-Z][a-z]{2,10}", 0..8),
        codes in proptest::collection::vec("[0-9]{4}-[0-9]", 0..8),
    ) {
        let mut m = CompositionManager::new("a", "s", "t");
        for (i, ty) in types.iter().enumerate() {
            let r = m.create_resource(ty, "urn:uuid:1234", Some(&format!("r-{i}"))).unwrap();
            if let Some(code) = codes.get(i) {
                r.add_parameter(
                    "code",
                    ParameterValue::Token {
                        system: None,
                        code: code.clone(),
                    },
                )
                .unwrap();
            }
        }
        prop_assert_eq!(m.to_specification(FHIR).unwrap(), m.to_specification(FHIR).unwrap());
        prop_assert_eq!(m.to_specification(FHIR).unwrap().len(), types.len());
    }
}

use serde_json::json;

use super::*;

#[test]
fn raw_contact_deserializes_known_and_extra_fields() {
    let raw: RawContact = serde_json::from_value(json!({
        "name": "Jo Smith",
        "phoneNumber": "555-123-4567",
        "email": "jo@example.com",
        "leadSource": "webinar",
        "referenceDate": "2026-03-01"
    }))
    .unwrap();

    assert_eq!(raw.str_field("name"), Some("Jo Smith"));
    assert_eq!(raw.str_field("phoneNumber"), Some("555-123-4567"));
    assert_eq!(raw.str_field("leadSource"), Some("webinar"));
    assert_eq!(raw.str_field("referenceDate"), Some("2026-03-01"));
}

#[test]
fn raw_contact_tolerates_non_string_values() {
    // A spreadsheet column of numbers must not break deserialization;
    // rejecting it is the validator's job.
    let raw: RawContact = serde_json::from_value(json!({
        "name": 42,
        "phoneNumber": ["555"]
    }))
    .unwrap();

    assert!(raw.field("name").is_some());
    assert_eq!(raw.str_field("name"), None);
    assert_eq!(raw.str_field("phoneNumber"), None);
}

#[test]
fn raw_contact_missing_fields_are_none() {
    let raw: RawContact = serde_json::from_value(json!({})).unwrap();
    assert_eq!(raw.field("name"), None);
    assert_eq!(raw.field("phoneNumber"), None);
    assert_eq!(raw.field("email"), None);
    assert_eq!(raw.field("anythingElse"), None);
}

#[test]
fn contact_serializes_camel_case_and_flattens_extra() {
    let mut extra = BTreeMap::new();
    extra.insert("leadSource".to_string(), json!("referral"));

    let contact = Contact {
        name: "Al Reyes".to_string(),
        phone_number: "5551234567".to_string(),
        email: None,
        extra,
    };

    let value = serde_json::to_value(&contact).unwrap();
    assert_eq!(
        value,
        json!({
            "name": "Al Reyes",
            "phoneNumber": "5551234567",
            "leadSource": "referral"
        })
    );
}

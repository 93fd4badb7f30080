//! Integration tests for claim payload building.
//!
//! Expected values are the exact JSON strings the API receives in the
//! `value` form field.

use serde_json::{Value, json};
use wikibase_edit::claim::{ClaimError, Snaktype};
use wikibase_edit::{ClaimInput, ClaimRequest, Datatype, PropertyTable, build_create_claim};

const SANDBOX: &str = "Q4115189";
const INSTANCE: &str = "https://test.wikidata.org";

fn properties() -> PropertyTable {
    PropertyTable::from_json_str(
        r#"{
            "P50": "wikibase-item",
            "P578": "time",
            "P600": "external-id",
            "P626": "globe-coordinate",
            "P1106": "quantity",
            "P1476": "monolingualtext",
            "P2078": "url",
            "P2302": "wikibase-property",
            "P18": "commonsMedia"
        }"#,
    )
    .expect("property fixture is valid JSON")
}

fn create(property: &str, value: Value) -> Result<ClaimRequest, ClaimError> {
    build_create_claim(
        &ClaimInput::new(SANDBOX, property, value),
        &properties(),
        INSTANCE,
    )
}

fn encoded(property: &str, value: Value) -> String {
    let request = create(property, value).expect("claim should build");
    assert_eq!(request.data.entity, SANDBOX);
    assert_eq!(request.data.property, property);
    assert_eq!(request.data.snaktype, Snaktype::Value);
    request.data.value.expect("value snak carries a value")
}

fn time_json(time: &str, precision: u8) -> String {
    format!(
        r#"{{"time":"{time}","timezone":0,"before":0,"after":0,"precision":{precision},"calendarmodel":"http://www.wikidata.org/entity/Q1985727"}}"#
    )
}

#[test]
fn test_action_is_wbcreateclaim() {
    let request = create("P600", json!("someid")).unwrap();
    assert_eq!(request.action, "wbcreateclaim");
}

#[test]
fn test_external_id() {
    let request = create("P600", json!("someid")).unwrap();
    assert_eq!(
        serde_json::to_value(&request.data).unwrap(),
        json!({
            "entity": SANDBOX,
            "property": "P600",
            "snaktype": "value",
            "value": "\"someid\""
        })
    );
}

#[test]
fn test_wikibase_item() {
    assert_eq!(
        encoded("P50", json!("Q627323")),
        r#"{"entity-type":"item","numeric-id":627323}"#
    );
}

#[test]
fn test_wikibase_property() {
    assert_eq!(
        encoded("P2302", json!("P31")),
        r#"{"entity-type":"property","numeric-id":31}"#
    );
}

#[test]
fn test_year_month_day_precision() {
    assert_eq!(
        encoded("P578", json!("1802")),
        time_json("+1802-00-00T00:00:00Z", 9)
    );
    assert_eq!(
        encoded("P578", json!("1802-02")),
        time_json("+1802-02-00T00:00:00Z", 10)
    );
    assert_eq!(
        encoded("P578", json!("1802-02-03")),
        time_json("+1802-02-03T00:00:00Z", 11)
    );
}

#[test]
fn test_time_with_low_precision() {
    assert_eq!(
        encoded("P578", json!({"time": "2500000", "precision": 4})),
        time_json("+2500000-00-00T00:00:00Z", 4)
    );
}

#[test]
fn test_time_before_common_era() {
    assert_eq!(
        encoded("P578", json!("-0044-03-15")),
        time_json("-0044-03-15T00:00:00Z", 11)
    );
}

#[test]
fn test_invalid_times_are_rejected() {
    for value in ["1802-22-33", "1802-02-04T11", "1802-02-30", "not a date"] {
        let err = create("P578", json!(value)).unwrap_err();
        assert!(
            err.to_string().contains("invalid time value"),
            "{value}: unexpected error {err}"
        );
    }
}

#[test]
fn test_leap_day() {
    assert!(create("P578", json!("2000-02-29")).is_ok());
    assert!(create("P578", json!("1900-02-29")).is_err());
}

#[test]
fn test_monolingual_text() {
    assert_eq!(
        encoded("P1476", json!({"text": "bulgroz", "language": "fr"})),
        r#"{"text":"bulgroz","language":"fr"}"#
    );
}

#[test]
fn test_quantities() {
    assert_eq!(encoded("P1106", json!(9000)), r#"{"amount":"+9000","unit":"1"}"#);
    assert_eq!(encoded("P1106", json!("9001")), r#"{"amount":"+9001","unit":"1"}"#);
    assert_eq!(encoded("P1106", json!(-9002)), r#"{"amount":"-9002","unit":"1"}"#);
}

#[test]
fn test_quantity_with_item_unit() {
    assert_eq!(
        encoded("P1106", json!({"amount": 9001, "unit": "Q7727"})),
        format!(r#"{{"amount":"+9001","unit":"{INSTANCE}/entity/Q7727"}}"#)
    );
}

#[test]
fn test_quantity_with_bounds() {
    assert_eq!(
        encoded(
            "P1106",
            json!({"amount": "10", "upperBound": "11", "lowerBound": "9"})
        ),
        r#"{"amount":"+10","unit":"1","upperBound":"+11","lowerBound":"+9"}"#
    );
}

#[test]
fn test_invalid_string_number() {
    let err = create("P1106", json!("900$1")).unwrap_err();
    assert!(err.to_string().contains("invalid string number"), "{err}");
}

#[test]
fn test_url_and_media_are_plain_strings() {
    assert_eq!(encoded("P2078", json!("http://foo.bar")), r#""http://foo.bar""#);
    assert_eq!(
        encoded("P18", json!("Example.jpg")),
        r#""Example.jpg""#
    );
}

#[test]
fn test_globe_coordinate() {
    assert_eq!(
        encoded(
            "P626",
            json!({"latitude": 45.758, "longitude": 4.84138, "precision": 1.0 / 360.0})
        ),
        r#"{"latitude":45.758,"longitude":4.84138,"precision":0.002777777777777778}"#
    );
}

#[test]
fn test_snaktype_overrides() {
    for (raw, snaktype) in [("novalue", "novalue"), ("somevalue", "somevalue")] {
        let request = create("P1106", json!({"snaktype": raw})).unwrap();
        assert_eq!(
            serde_json::to_value(&request.data).unwrap(),
            json!({"entity": SANDBOX, "property": "P1106", "snaktype": snaktype})
        );
    }
}

#[test]
fn test_unknown_property() {
    let err = create("P999999", json!("x")).unwrap_err();
    assert!(matches!(err, ClaimError::UnknownProperty { .. }));
}

#[test]
fn test_wrong_shape_names_the_datatype() {
    let err = create("P600", json!(42)).unwrap_err();
    assert!(matches!(err, ClaimError::InvalidValue { .. }));
    assert!(err.to_string().contains("external-id"), "{err}");
}

/// Valid inputs for a datatype, covering both the shorthand and object forms.
fn samples(datatype: Datatype) -> Vec<Value> {
    match datatype {
        Datatype::ExternalId => vec![json!("someid")],
        Datatype::String => vec![json!("bulgroz")],
        Datatype::Url => vec![json!("http://foo.bar")],
        Datatype::CommonsMedia => vec![json!("Example.jpg")],
        Datatype::GeoShape => vec![json!("Data:Lyon.map")],
        Datatype::TabularData => vec![json!("Data:Population.tab")],
        Datatype::Math => vec![json!("a^2 + b^2 = c^2")],
        Datatype::MusicalNotation => vec![json!("\\relative c' { c d e f g }")],
        Datatype::WikibaseItem => vec![json!("Q627323")],
        Datatype::WikibaseProperty => vec![json!("P31")],
        Datatype::Time => vec![
            json!("1802"),
            json!("1802-02"),
            json!({"time": "2500000", "precision": 4}),
        ],
        Datatype::MonolingualText => vec![json!({"text": "bulgroz", "language": "fr"})],
        Datatype::Quantity => vec![
            json!(9000),
            json!(-0.25),
            json!({"amount": 9001, "unit": "Q7727"}),
        ],
        Datatype::GlobeCoordinate => vec![json!({
            "latitude": 45.758,
            "longitude": 4.84138,
            "precision": 1.0 / 360.0
        })],
    }
}

/// Feeding an encoded value back through the builder yields the same string.
#[test]
fn test_encoded_values_are_stable_when_re_encoded() {
    let mut properties = PropertyTable::new();
    for (index, datatype) in Datatype::ALL.into_iter().enumerate() {
        properties = properties.with(format!("P{}", 100 + index), datatype.as_str());
    }

    for (index, datatype) in Datatype::ALL.into_iter().enumerate() {
        let property = format!("P{}", 100 + index);
        let encode = |value: Value| {
            build_create_claim(&ClaimInput::new(SANDBOX, &property, value), &properties, INSTANCE)
                .unwrap_or_else(|err| panic!("{datatype}: {err}"))
                .data
                .value
                .expect("value snak carries a value")
        };
        for value in samples(datatype) {
            let first = encode(value);
            let reparsed: Value = serde_json::from_str(&first).unwrap();
            let second = encode(reparsed);
            assert_eq!(first, second, "{datatype} changed on re-encoding");
        }
    }
}

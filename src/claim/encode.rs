//! Snak value shapes and the encoders for plain datatypes.
//!
//! [`EncodedValue`] serializes to exactly the JSON the `wbcreateclaim`
//! `value` parameter expects. Field order follows the Wikibase JSON model.
//! Time and quantity encoders live in their own modules.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Number, Value};

use super::datatype::Datatype;
use super::ClaimError;

/// Item ids: `Q` followed by the numeric id.
#[allow(clippy::expect_used)]
static ITEM_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Q([0-9]+)$").expect("item id regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static PROPERTY_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P([0-9]+)$").expect("property id regex is valid") // Static pattern, safe to panic
});

/// Whether `id` is a property id such as `P31`.
pub(crate) fn is_property_id(id: &str) -> bool {
    PROPERTY_ID_PATTERN.is_match(id)
}

/// Wikibase Gregorian calendar model, the only one emitted by the time encoder.
pub const GREGORIAN_CALENDAR_MODEL: &str = "http://www.wikidata.org/entity/Q1985727";

/// The value part of a snak, before JSON stringification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EncodedValue {
    /// Bare JSON string (`string`, `external-id`, `url` and friends).
    String(String),
    /// `wikibase-item` / `wikibase-property`.
    EntityId(EntityIdValue),
    /// `time`.
    Time(TimeValue),
    /// `monolingualtext`.
    MonolingualText(MonolingualTextValue),
    /// `quantity`.
    Quantity(QuantityValue),
    /// `globe-coordinate`.
    GlobeCoordinate(GlobeCoordinateValue),
}

impl EncodedValue {
    /// Serializes the value to the JSON text sent as the snak `value` field.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn to_wire_string(&self) -> String {
        // Only string keys and finite numbers, so serialization cannot fail.
        serde_json::to_string(self).expect("encoded snak values always serialize")
    }
}

/// Entity kind referenced by an entity id value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// `Q` ids.
    Item,
    /// `P` ids.
    Property,
}

impl EntityType {
    fn prefix(self) -> char {
        match self {
            Self::Item => 'Q',
            Self::Property => 'P',
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            Self::Item => &ITEM_ID_PATTERN,
            Self::Property => &PROPERTY_ID_PATTERN,
        }
    }

    fn datatype(self) -> Datatype {
        match self {
            Self::Item => Datatype::WikibaseItem,
            Self::Property => Datatype::WikibaseProperty,
        }
    }
}

/// `{"entity-type":"item","numeric-id":42}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityIdValue {
    #[serde(rename = "entity-type")]
    pub entity_type: EntityType,
    #[serde(rename = "numeric-id")]
    pub numeric_id: u64,
}

/// Wikibase time value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeValue {
    pub time: String,
    pub timezone: i32,
    pub before: u32,
    pub after: u32,
    pub precision: u8,
    pub calendarmodel: String,
}

/// Text with its language code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonolingualTextValue {
    pub text: String,
    pub language: String,
}

/// Signed decimal amount with unit and optional bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuantityValue {
    pub amount: String,
    pub unit: String,
    #[serde(rename = "upperBound", skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<String>,
    #[serde(rename = "lowerBound", skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<String>,
}

/// Coordinates are kept as JSON numbers so their textual form is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobeCoordinateValue {
    pub latitude: Number,
    pub longitude: Number,
    pub precision: Number,
}

pub(crate) fn string_like(datatype: Datatype, value: &Value) -> Result<EncodedValue, ClaimError> {
    match value {
        Value::String(text) => Ok(EncodedValue::String(text.clone())),
        other => Err(ClaimError::invalid_value(
            datatype.as_str(),
            "expected a string",
            other,
        )),
    }
}

/// Accepts `42`, `"Q42"`, `{"id":"Q42"}` or an already encoded entity id object.
pub(crate) fn entity_id(
    entity_type: EntityType,
    value: &Value,
) -> Result<EncodedValue, ClaimError> {
    let datatype = entity_type.datatype().as_str();
    let numeric_id = match value {
        Value::Number(number) => number.as_u64(),
        Value::String(id) => parse_prefixed_id(entity_type, id),
        Value::Object(map) => {
            if let Some(Value::String(id)) = map.get("id") {
                parse_prefixed_id(entity_type, id)
            } else if map.get("entity-type").and_then(Value::as_str)
                == Some(entity_type_name(entity_type))
            {
                map.get("numeric-id").and_then(Value::as_u64)
            } else {
                None
            }
        }
        _ => None,
    };

    match numeric_id {
        Some(numeric_id) if numeric_id > 0 => Ok(EncodedValue::EntityId(EntityIdValue {
            entity_type,
            numeric_id,
        })),
        _ => Err(ClaimError::invalid_value(
            datatype,
            format!(
                "expected a positive numeric id or a '{}<digits>' id",
                entity_type.prefix()
            ),
            value,
        )),
    }
}

fn entity_type_name(entity_type: EntityType) -> &'static str {
    match entity_type {
        EntityType::Item => "item",
        EntityType::Property => "property",
    }
}

fn parse_prefixed_id(entity_type: EntityType, id: &str) -> Option<u64> {
    entity_type
        .pattern()
        .captures(id)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}

pub(crate) fn monolingual_text(value: &Value) -> Result<EncodedValue, ClaimError> {
    let datatype = Datatype::MonolingualText.as_str();
    let Value::Object(map) = value else {
        return Err(ClaimError::invalid_value(
            datatype,
            "expected an object with 'text' and 'language'",
            value,
        ));
    };

    let text = map.get("text").and_then(Value::as_str);
    let language = map.get("language").and_then(Value::as_str);
    match (text, language) {
        (Some(text), Some(language)) => Ok(EncodedValue::MonolingualText(MonolingualTextValue {
            text: text.to_string(),
            language: language.to_string(),
        })),
        _ => Err(ClaimError::invalid_value(
            datatype,
            "'text' and 'language' must both be strings",
            value,
        )),
    }
}

pub(crate) fn globe_coordinate(value: &Value) -> Result<EncodedValue, ClaimError> {
    let datatype = Datatype::GlobeCoordinate.as_str();
    let Value::Object(map) = value else {
        return Err(ClaimError::invalid_value(
            datatype,
            "expected an object with 'latitude', 'longitude' and 'precision'",
            value,
        ));
    };

    let field = |name: &str| -> Result<Number, ClaimError> {
        match map.get(name) {
            Some(Value::Number(number)) => Ok(number.clone()),
            _ => Err(ClaimError::invalid_value(
                datatype,
                format!("'{name}' must be a number"),
                value,
            )),
        }
    };

    let latitude = field("latitude")?;
    let longitude = field("longitude")?;
    let precision = field("precision")?;

    if !latitude.as_f64().is_some_and(|lat| (-90.0..=90.0).contains(&lat)) {
        return Err(ClaimError::invalid_value(
            datatype,
            "latitude must be between -90 and 90",
            value,
        ));
    }
    if !longitude.as_f64().is_some_and(|lon| (-360.0..=360.0).contains(&lon)) {
        return Err(ClaimError::invalid_value(
            datatype,
            "longitude must be between -360 and 360",
            value,
        ));
    }
    if !precision.as_f64().is_some_and(|p| p > 0.0) {
        return Err(ClaimError::invalid_value(
            datatype,
            "precision must be positive",
            value,
        ));
    }

    Ok(EncodedValue::GlobeCoordinate(GlobeCoordinateValue {
        latitude,
        longitude,
        precision,
    }))
}

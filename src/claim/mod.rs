//! Claim payload building for `wbcreateclaim`.
//!
//! This module turns loosely typed user values into the snak representation
//! the Wikibase API expects, selecting the encoder from the property's
//! declared datatype.
//!
//! # Architecture
//!
//! - [`Datatype`] - Closed set of supported datatypes, each mapped to one encoder
//! - [`PropertyMetadata`] / [`PropertyTable`] - Property id to datatype lookup
//! - [`ClaimBuilder`] - Validates a [`ClaimInput`] and assembles a [`ClaimRequest`]
//! - [`EncodedValue`] - Snak value before JSON stringification
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use wikibase_edit::claim::{ClaimBuilder, ClaimInput, PropertyTable};
//!
//! let properties = PropertyTable::new().with("P1106", "quantity");
//! let builder = ClaimBuilder::new(&properties, "https://www.wikidata.org");
//!
//! let request = builder
//!     .build(&ClaimInput::new("Q4115189", "P1106", json!(9000)))
//!     .unwrap();
//! assert_eq!(request.action, "wbcreateclaim");
//! assert_eq!(request.data.value.as_deref(), Some(r#"{"amount":"+9000","unit":"1"}"#));
//! ```

mod datatype;
mod encode;
mod error;
mod properties;
mod quantity;
mod time;

pub use datatype::{Datatype, EncodeContext};
pub use encode::{
    EncodedValue, EntityIdValue, EntityType, GREGORIAN_CALENDAR_MODEL, GlobeCoordinateValue,
    MonolingualTextValue, QuantityValue, TimeValue,
};
pub use error::ClaimError;
pub use properties::{PropertyMetadata, PropertyTable};
pub use quantity::{DIMENSIONLESS_UNIT, encode_quantity};
pub use time::{PRECISION_DAY, PRECISION_MONTH, PRECISION_YEAR, encode_time};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

/// API action that creates a claim.
pub const CREATE_CLAIM_ACTION: &str = "wbcreateclaim";

/// Whether a snak carries a value, asserts absence, or asserts an unknown value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Snaktype {
    Value,
    NoValue,
    SomeValue,
}

impl Snaktype {
    /// Returns the API name of the snaktype.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::NoValue => "novalue",
            Self::SomeValue => "somevalue",
        }
    }
}

/// The value of a claim: raw input to encode, or a snaktype override.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimValue {
    /// Datatype-dependent raw value (string, number, or object).
    Raw(Value),
    /// `{"snaktype": "novalue"}`
    NoValue,
    /// `{"snaktype": "somevalue"}`
    SomeValue,
}

impl From<Value> for ClaimValue {
    /// Objects of the form `{"snaktype": "novalue" | "somevalue"}` become
    /// overrides, everything else is kept as a raw value.
    fn from(value: Value) -> Self {
        let snaktype = value
            .as_object()
            .and_then(|map| map.get("snaktype"))
            .and_then(Value::as_str);
        match snaktype {
            Some("novalue") => Self::NoValue,
            Some("somevalue") => Self::SomeValue,
            _ => Self::Raw(value),
        }
    }
}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        Self::Raw(Value::from(value))
    }
}

/// A claim to create on an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimInput {
    /// Entity receiving the claim (e.g. `Q42`).
    pub entity: String,
    /// Property id (e.g. `P31`).
    pub property: String,
    /// Raw value for the property's datatype, or a snaktype override.
    pub value: ClaimValue,
}

impl ClaimInput {
    /// Creates a claim input.
    pub fn new(
        entity: impl Into<String>,
        property: impl Into<String>,
        value: impl Into<ClaimValue>,
    ) -> Self {
        Self {
            entity: entity.into(),
            property: property.into(),
            value: value.into(),
        }
    }
}

/// A snak ready to send. `value`, when present, is JSON text, not a nested object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snak {
    pub entity: String,
    pub property: String,
    pub snaktype: Snaktype,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Snak {
    /// Form fields for the request body, in API parameter order.
    #[must_use]
    pub fn form_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("entity".to_string(), self.entity.clone()),
            ("property".to_string(), self.property.clone()),
            ("snaktype".to_string(), self.snaktype.as_str().to_string()),
        ];
        if let Some(value) = &self.value {
            params.push(("value".to_string(), value.clone()));
        }
        params
    }
}

/// An API action together with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimRequest {
    pub action: &'static str,
    pub data: Snak,
}

/// Builds `wbcreateclaim` payloads against a property metadata table.
#[derive(Debug)]
pub struct ClaimBuilder<'a, M: ?Sized> {
    properties: &'a M,
    instance: &'a str,
}

impl<'a, M: PropertyMetadata + ?Sized> ClaimBuilder<'a, M> {
    /// Creates a builder. `instance` is the Wikibase base URL, used to
    /// expand item-id units into entity URIs.
    pub fn new(properties: &'a M, instance: &'a str) -> Self {
        Self {
            properties,
            instance: instance.trim_end_matches('/'),
        }
    }

    /// Builds the claim payload. Pure: no I/O, no mutation.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimError::UnknownProperty`] when the property id is not
    /// `P<digits>`, is missing from the metadata table or declares a
    /// datatype without an encoder,
    /// and the encoder's error when the value has the wrong shape. Snaktype
    /// overrides never reach an encoder.
    #[instrument(
        level = "debug",
        skip(self, input),
        fields(entity = %input.entity, property = %input.property)
    )]
    pub fn build(&self, input: &ClaimInput) -> Result<ClaimRequest, ClaimError> {
        if !encode::is_property_id(&input.property) {
            return Err(ClaimError::malformed_property(&input.property));
        }

        let (snaktype, value) = match &input.value {
            ClaimValue::NoValue => (Snaktype::NoValue, None),
            ClaimValue::SomeValue => (Snaktype::SomeValue, None),
            ClaimValue::Raw(raw) => {
                let datatype = self.resolve_datatype(&input.property)?;
                let ctx = EncodeContext {
                    instance: self.instance,
                };
                let encoded = datatype.encode(raw, &ctx)?;
                debug!(%datatype, "encoded claim value");
                (Snaktype::Value, Some(encoded.to_wire_string()))
            }
        };

        Ok(ClaimRequest {
            action: CREATE_CLAIM_ACTION,
            data: Snak {
                entity: input.entity.clone(),
                property: input.property.clone(),
                snaktype,
                value,
            },
        })
    }

    fn resolve_datatype(&self, property: &str) -> Result<Datatype, ClaimError> {
        match self.properties.declared_datatype(property) {
            None => Err(ClaimError::unknown_property(property)),
            Some(declared) => self
                .properties
                .datatype_of(property)
                .ok_or_else(|| ClaimError::unsupported_datatype(property, declared)),
        }
    }
}

/// Builds a `wbcreateclaim` payload in one call.
///
/// # Errors
///
/// See [`ClaimBuilder::build`].
pub fn build_create_claim<M: PropertyMetadata + ?Sized>(
    input: &ClaimInput,
    properties: &M,
    instance: &str,
) -> Result<ClaimRequest, ClaimError> {
    ClaimBuilder::new(properties, instance).build(input)
}

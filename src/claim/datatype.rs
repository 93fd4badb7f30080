//! Wikibase property datatypes and their encoders.
//!
//! The mapping from datatype to encoder is a closed `match`: adding a
//! datatype means adding a variant, its wire name, and one arm in
//! [`Datatype::encode`].

use std::fmt;

use serde_json::Value;

use super::encode::{self, EncodedValue, EntityType};
use super::{ClaimError, quantity, time};

/// A Wikibase property datatype that has a value encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Datatype {
    /// `external-id`
    ExternalId,
    /// `string`
    String,
    /// `url`
    Url,
    /// `commonsMedia` (file name on Wikimedia Commons)
    CommonsMedia,
    /// `geo-shape` (page name on Commons)
    GeoShape,
    /// `tabular-data` (page name on Commons)
    TabularData,
    /// `math` (TeX source)
    Math,
    /// `musical-notation` (LilyPond source)
    MusicalNotation,
    /// `wikibase-item`
    WikibaseItem,
    /// `wikibase-property`
    WikibaseProperty,
    /// `time`
    Time,
    /// `monolingualtext`
    MonolingualText,
    /// `quantity`
    Quantity,
    /// `globe-coordinate`
    GlobeCoordinate,
}

/// Instance-dependent inputs some encoders need.
#[derive(Debug, Clone, Copy)]
pub struct EncodeContext<'a> {
    /// Base URL of the Wikibase instance, without trailing slash.
    pub instance: &'a str,
}

impl Datatype {
    /// Every supported datatype.
    pub const ALL: [Self; 14] = [
        Self::ExternalId,
        Self::String,
        Self::Url,
        Self::CommonsMedia,
        Self::GeoShape,
        Self::TabularData,
        Self::Math,
        Self::MusicalNotation,
        Self::WikibaseItem,
        Self::WikibaseProperty,
        Self::Time,
        Self::MonolingualText,
        Self::Quantity,
        Self::GlobeCoordinate,
    ];

    /// Returns the datatype name used by the Wikibase API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExternalId => "external-id",
            Self::String => "string",
            Self::Url => "url",
            Self::CommonsMedia => "commonsMedia",
            Self::GeoShape => "geo-shape",
            Self::TabularData => "tabular-data",
            Self::Math => "math",
            Self::MusicalNotation => "musical-notation",
            Self::WikibaseItem => "wikibase-item",
            Self::WikibaseProperty => "wikibase-property",
            Self::Time => "time",
            Self::MonolingualText => "monolingualtext",
            Self::Quantity => "quantity",
            Self::GlobeCoordinate => "globe-coordinate",
        }
    }

    /// Parses a Wikibase datatype name. Returns `None` for datatypes without an encoder.
    #[must_use]
    pub fn from_wikibase_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|datatype| datatype.as_str() == name)
    }

    /// Encodes a raw value into the value part of a snak.
    ///
    /// # Errors
    ///
    /// Returns the [`ClaimError`] raised by the datatype's encoder when the
    /// value has the wrong shape.
    pub fn encode(
        self,
        value: &Value,
        ctx: &EncodeContext<'_>,
    ) -> Result<EncodedValue, ClaimError> {
        match self {
            Self::ExternalId
            | Self::String
            | Self::Url
            | Self::CommonsMedia
            | Self::GeoShape
            | Self::TabularData
            | Self::Math
            | Self::MusicalNotation => encode::string_like(self, value),
            Self::WikibaseItem => encode::entity_id(EntityType::Item, value),
            Self::WikibaseProperty => encode::entity_id(EntityType::Property, value),
            Self::Time => time::encode_time(value),
            Self::MonolingualText => encode::monolingual_text(value),
            Self::Quantity => quantity::encode_quantity(value, ctx.instance),
            Self::GlobeCoordinate => encode::globe_coordinate(value),
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip() {
        for datatype in Datatype::ALL {
            assert_eq!(
                Datatype::from_wikibase_name(datatype.as_str()),
                Some(datatype),
                "{datatype} should parse back from its wire name"
            );
        }
    }

    #[test]
    fn test_unsupported_names_are_rejected() {
        assert_eq!(Datatype::from_wikibase_name("wikibase-lexeme"), None);
        assert_eq!(Datatype::from_wikibase_name("WIKIBASE-ITEM"), None);
        assert_eq!(Datatype::from_wikibase_name(""), None);
    }

    #[test]
    fn test_string_like_datatypes_share_encoding() {
        let ctx = EncodeContext {
            instance: "https://example.org",
        };
        for datatype in [Datatype::CommonsMedia, Datatype::Math, Datatype::ExternalId] {
            let encoded = datatype.encode(&Value::from("x.jpg"), &ctx).unwrap();
            assert_eq!(encoded.to_wire_string(), "\"x.jpg\"");
        }
    }
}

//! Property metadata: which datatype each property declares.

use std::collections::HashMap;
use std::io::Read;

use serde::Deserialize;

use super::datatype::Datatype;

/// Read-only lookup of a property's declared datatype.
///
/// Returns `None` both for unknown properties and for datatypes without an
/// encoder; [`PropertyMetadata::declared_datatype`] tells them apart.
pub trait PropertyMetadata {
    /// Returns the raw datatype name declared for `property`, if known.
    fn declared_datatype(&self, property: &str) -> Option<&str>;

    /// Returns the encodable datatype declared for `property`.
    fn datatype_of(&self, property: &str) -> Option<Datatype> {
        self.declared_datatype(property)
            .and_then(Datatype::from_wikibase_name)
    }
}

/// In-memory property table, typically loaded from a
/// `{"P31": "wikibase-item", ...}` JSON document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct PropertyTable {
    datatypes: HashMap<String, String>,
}

impl PropertyTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object mapping property ids to datatype names.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the document is not such an object.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Like [`PropertyTable::from_json_str`], reading from `reader`.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error on I/O failure or malformed input.
    pub fn from_reader(reader: impl Read) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    /// Declares the datatype of a property, replacing any previous entry.
    pub fn insert(&mut self, property: impl Into<String>, datatype: impl Into<String>) {
        self.datatypes.insert(property.into(), datatype.into());
    }

    /// Builder-style [`PropertyTable::insert`].
    #[must_use]
    pub fn with(mut self, property: impl Into<String>, datatype: impl Into<String>) -> Self {
        self.insert(property, datatype);
        self
    }

    /// Number of declared properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.datatypes.len()
    }

    /// Returns true if no property is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.datatypes.is_empty()
    }
}

impl PropertyMetadata for PropertyTable {
    fn declared_datatype(&self, property: &str) -> Option<&str> {
        self.datatypes.get(property).map(String::as_str)
    }
}

impl PropertyMetadata for HashMap<String, Datatype> {
    fn declared_datatype(&self, property: &str) -> Option<&str> {
        self.get(property).map(|datatype| datatype.as_str())
    }

    fn datatype_of(&self, property: &str) -> Option<Datatype> {
        self.get(property).copied()
    }
}

//! Error types for claim building.
//!
//! Every variant is raised while the payload is assembled, before any
//! request is sent, and none of them is retried.

use thiserror::Error;

/// Errors that can occur while encoding a claim value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    /// The value does not have the shape the property's datatype requires.
    #[error("invalid value for {datatype}: {reason} (got {value})")]
    InvalidValue {
        /// Wikibase datatype name of the property.
        datatype: String,
        /// Why the value was rejected.
        reason: String,
        /// Compact JSON rendering of the rejected value.
        value: String,
    },

    /// The time value is not a calendar date this encoder supports.
    #[error("invalid time value '{value}': {reason}")]
    InvalidTime {
        /// The rejected time input.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A quantity amount or bound is not a decimal number.
    #[error("invalid string number '{value}'")]
    InvalidNumber {
        /// The rejected numeric input.
        value: String,
    },

    /// The property is missing from the metadata table, or its datatype has no encoder.
    #[error("unknown property {property}: {reason}")]
    UnknownProperty {
        /// The property identifier that could not be resolved.
        property: String,
        /// What was missing.
        reason: String,
    },
}

impl ClaimError {
    /// Creates an invalid value error.
    pub fn invalid_value(
        datatype: impl Into<String>,
        reason: impl Into<String>,
        value: &serde_json::Value,
    ) -> Self {
        Self::InvalidValue {
            datatype: datatype.into(),
            reason: reason.into(),
            value: value.to_string(),
        }
    }

    /// Creates an invalid time error.
    pub fn invalid_time(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTime {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid number error.
    pub fn invalid_number(value: impl Into<String>) -> Self {
        Self::InvalidNumber {
            value: value.into(),
        }
    }

    /// Creates an error for a property absent from the metadata table.
    pub fn unknown_property(property: impl Into<String>) -> Self {
        Self::UnknownProperty {
            property: property.into(),
            reason: "not found in property metadata".to_string(),
        }
    }

    /// Creates an error for a property id that is not `P` followed by digits.
    pub fn malformed_property(property: impl Into<String>) -> Self {
        Self::UnknownProperty {
            property: property.into(),
            reason: "expected a property id like P31".to_string(),
        }
    }

    /// Creates an error for a property whose declared datatype has no encoder.
    pub fn unsupported_datatype(property: impl Into<String>, datatype: &str) -> Self {
        Self::UnknownProperty {
            property: property.into(),
            reason: format!("datatype '{datatype}' is not supported"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_time_message() {
        let err = ClaimError::invalid_time("1802-22-33", "month must be between 01 and 12");
        let msg = err.to_string();
        assert!(msg.contains("invalid time value"), "got: {msg}");
        assert!(msg.contains("1802-22-33"), "got: {msg}");
    }

    #[test]
    fn test_invalid_number_message() {
        let msg = ClaimError::invalid_number("900$1").to_string();
        assert!(msg.contains("invalid string number"), "got: {msg}");
        assert!(msg.contains("900$1"), "got: {msg}");
    }

    #[test]
    fn test_invalid_value_renders_json() {
        let err = ClaimError::invalid_value(
            "monolingualtext",
            "expected an object",
            &serde_json::json!(12),
        );
        let msg = err.to_string();
        assert!(msg.contains("monolingualtext"), "got: {msg}");
        assert!(msg.contains("got 12"), "got: {msg}");
    }

    #[test]
    fn test_unknown_property_variants_share_kind() {
        let missing = ClaimError::unknown_property("P999");
        let unsupported = ClaimError::unsupported_datatype("P1", "wikibase-lexeme");
        assert!(matches!(missing, ClaimError::UnknownProperty { .. }));
        assert!(matches!(unsupported, ClaimError::UnknownProperty { .. }));
        assert!(unsupported.to_string().contains("wikibase-lexeme"));
    }
}

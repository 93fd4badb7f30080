//! Quantity value encoder.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::ClaimError;
use super::encode::{EncodedValue, QuantityValue};

/// Unit of a dimensionless quantity.
pub const DIMENSIONLESS_UNIT: &str = "1";

#[allow(clippy::expect_used)]
static DECIMAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?[0-9]+(?:\.[0-9]+)?$")
        .expect("decimal regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static ITEM_UNIT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Q[0-9]+$").expect("unit item regex is valid") // Static pattern, safe to panic
});

/// Encodes a quantity value.
///
/// Accepts a number, a decimal string, or
/// `{"amount": ..., "unit": ..., "upperBound": ..., "lowerBound": ...}`
/// where everything but `amount` is optional. Amounts always carry an
/// explicit sign. A unit given as an item id is expanded to
/// `{instance}/entity/{id}`.
///
/// # Errors
///
/// Returns [`ClaimError::InvalidNumber`] for amounts or bounds that are not
/// plain decimals, and [`ClaimError::InvalidValue`] for a malformed unit,
/// unpaired or inconsistent bounds, or an unsupported input shape.
pub fn encode_quantity(value: &Value, instance: &str) -> Result<EncodedValue, ClaimError> {
    let quantity = match value {
        Value::Number(_) | Value::String(_) => QuantityValue {
            amount: signed_amount(value)?,
            unit: DIMENSIONLESS_UNIT.to_string(),
            upper_bound: None,
            lower_bound: None,
        },
        Value::Object(map) => {
            let amount = map
                .get("amount")
                .ok_or_else(|| ClaimError::invalid_value("quantity", "missing 'amount'", value))
                .and_then(signed_amount)?;
            let unit = match map.get("unit") {
                None | Some(Value::Null) => DIMENSIONLESS_UNIT.to_string(),
                Some(Value::String(unit)) => expand_unit(unit, instance)
                    .ok_or_else(|| ClaimError::invalid_value("quantity", "invalid unit", value))?,
                Some(_) => {
                    return Err(ClaimError::invalid_value(
                        "quantity",
                        "'unit' must be a string",
                        value,
                    ));
                }
            };
            let upper_bound = optional_amount(map.get("upperBound"))?;
            let lower_bound = optional_amount(map.get("lowerBound"))?;
            check_bounds(&amount, upper_bound.as_deref(), lower_bound.as_deref(), value)?;

            QuantityValue {
                amount,
                unit,
                upper_bound,
                lower_bound,
            }
        }
        other => {
            return Err(ClaimError::invalid_value(
                "quantity",
                "expected a number, a numeric string or an object with 'amount'",
                other,
            ));
        }
    };

    Ok(EncodedValue::Quantity(quantity))
}

fn optional_amount(raw: Option<&Value>) -> Result<Option<String>, ClaimError> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => signed_amount(raw).map(Some),
    }
}

/// Renders a number or decimal string with an explicit leading sign.
///
/// Numbers are written out in plain decimal notation, so `1e16` becomes
/// `+10000000000000000`. Strings must already be plain decimals.
fn signed_amount(raw: &Value) -> Result<String, ClaimError> {
    let text = match raw {
        Value::Number(number) => plain_decimal(number)?,
        Value::String(text) => text.trim().to_string(),
        other => return Err(ClaimError::invalid_number(other.to_string())),
    };

    // Exponent strings and anything else non-decimal end up here.
    if !DECIMAL_PATTERN.is_match(&text) {
        return Err(ClaimError::invalid_number(text));
    }

    if text.starts_with(['+', '-']) {
        Ok(text)
    } else {
        Ok(format!("+{text}"))
    }
}

/// Formats a JSON number without exponent notation.
fn plain_decimal(number: &serde_json::Number) -> Result<String, ClaimError> {
    if let Some(integer) = number.as_i64() {
        return Ok(integer.to_string());
    }
    if let Some(integer) = number.as_u64() {
        return Ok(integer.to_string());
    }
    match number.as_f64() {
        // `f64`'s Display never switches to exponent notation.
        Some(float) if float.is_finite() => Ok(float.to_string()),
        _ => Err(ClaimError::invalid_number(number.to_string())),
    }
}

fn expand_unit(unit: &str, instance: &str) -> Option<String> {
    if unit == DIMENSIONLESS_UNIT {
        Some(unit.to_string())
    } else if ITEM_UNIT_PATTERN.is_match(unit) {
        Some(format!("{instance}/entity/{unit}"))
    } else if unit.starts_with("http://") || unit.starts_with("https://") {
        Some(unit.to_string())
    } else {
        None
    }
}

fn check_bounds(
    amount: &str,
    upper: Option<&str>,
    lower: Option<&str>,
    value: &Value,
) -> Result<(), ClaimError> {
    match (upper, lower) {
        (None, None) => Ok(()),
        (Some(upper), Some(lower)) => {
            let parse = |text: &str| text.parse::<f64>().unwrap_or(f64::NAN);
            let (amount, upper, lower) = (parse(amount), parse(upper), parse(lower));
            if lower <= amount && amount <= upper {
                Ok(())
            } else {
                Err(ClaimError::invalid_value(
                    "quantity",
                    "bounds must satisfy lowerBound <= amount <= upperBound",
                    value,
                ))
            }
        }
        _ => Err(ClaimError::invalid_value(
            "quantity",
            "'upperBound' and 'lowerBound' must be given together",
            value,
        )),
    }
}

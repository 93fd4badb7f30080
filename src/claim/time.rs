//! Time value encoder.
//!
//! Accepts calendar dates at year, month or day granularity and emits the
//! Wikibase time model with the Gregorian calendar. Time-of-day input is
//! rejected: the encoder never truncates a finer value than it can emit.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::ClaimError;
use super::encode::{EncodedValue, GREGORIAN_CALENDAR_MODEL, TimeValue};

/// Precision code for a year.
pub const PRECISION_YEAR: u8 = 9;
/// Precision code for a month.
pub const PRECISION_MONTH: u8 = 10;
/// Precision code for a day, the finest this encoder supports.
pub const PRECISION_DAY: u8 = 11;

/// `YYYY`, `YYYY-MM` or `YYYY-MM-DD`, with an optional sign on the year.
#[allow(clippy::expect_used)]
static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?)([0-9]{1,16})(?:-([0-9]{2})(?:-([0-9]{2}))?)?$")
        .expect("date regex is valid") // Static pattern, safe to panic
});

/// The encoder's own output form, `+1802-02-00T00:00:00Z`.
#[allow(clippy::expect_used)]
static CANONICAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-])([0-9]{1,16})-([0-9]{2})-([0-9]{2})T00:00:00Z$")
        .expect("canonical time regex is valid") // Static pattern, safe to panic
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CalendarDate {
    negative: bool,
    year: u64,
    month: Option<u8>,
    day: Option<u8>,
}

impl CalendarDate {
    /// Finest precision the input carries.
    fn granularity(&self) -> u8 {
        match (self.month, self.day) {
            (Some(_), Some(_)) => PRECISION_DAY,
            (Some(_), None) => PRECISION_MONTH,
            _ => PRECISION_YEAR,
        }
    }

    fn to_wikibase_time(self, precision: u8) -> String {
        let sign = if self.negative { '-' } else { '+' };
        let month = if precision >= PRECISION_MONTH {
            self.month.unwrap_or(0)
        } else {
            0
        };
        let day = if precision >= PRECISION_DAY {
            self.day.unwrap_or(0)
        } else {
            0
        };
        format!("{sign}{:04}-{month:02}-{day:02}T00:00:00Z", self.year)
    }
}

/// Encodes a time value.
///
/// Strings infer their precision from granularity (9, 10 or 11). Objects of
/// the form `{"time": ..., "precision": ...}` override it, e.g. precision 4
/// for a hundred-thousand-year scale.
///
/// # Errors
///
/// Returns [`ClaimError::InvalidTime`] when the date does not parse, is not
/// a real calendar date, or the precision is out of range, and
/// [`ClaimError::InvalidValue`] for inputs that are neither strings nor objects.
pub fn encode_time(value: &Value) -> Result<EncodedValue, ClaimError> {
    let (date, precision) = match value {
        Value::String(text) => {
            let date = parse_date(text)?;
            (date, date.granularity())
        }
        Value::Object(map) => {
            let text = match map.get("time") {
                Some(Value::String(text)) => text.clone(),
                Some(Value::Number(year)) if year.is_u64() => year.to_string(),
                _ => {
                    return Err(ClaimError::invalid_value(
                        "time",
                        "'time' must be a date string",
                        value,
                    ));
                }
            };
            let date = parse_date(&text)?;
            let precision = match map.get("precision") {
                None | Some(Value::Null) => date.granularity(),
                Some(raw) => explicit_precision(&text, raw, date.granularity())?,
            };
            (date, precision)
        }
        other => {
            return Err(ClaimError::invalid_value(
                "time",
                "expected a date string or an object with 'time' and 'precision'",
                other,
            ));
        }
    };

    Ok(EncodedValue::Time(TimeValue {
        time: date.to_wikibase_time(precision),
        timezone: 0,
        before: 0,
        after: 0,
        precision,
        calendarmodel: GREGORIAN_CALENDAR_MODEL.to_string(),
    }))
}

fn explicit_precision(text: &str, raw: &Value, granularity: u8) -> Result<u8, ClaimError> {
    let precision = raw
        .as_u64()
        .and_then(|p| u8::try_from(p).ok())
        .filter(|p| *p <= PRECISION_DAY)
        .ok_or_else(|| {
            ClaimError::invalid_time(
                text,
                format!("precision {raw} is not supported (expected 0 to {PRECISION_DAY})"),
            )
        })?;

    if precision > granularity {
        return Err(ClaimError::invalid_time(
            text,
            format!("precision {precision} is finer than the date given"),
        ));
    }
    Ok(precision)
}

fn parse_date(text: &str) -> Result<CalendarDate, ClaimError> {
    let text = text.trim();

    let (caps, canonical) = if let Some(caps) = DATE_PATTERN.captures(text) {
        (caps, false)
    } else if let Some(caps) = CANONICAL_PATTERN.captures(text) {
        (caps, true)
    } else {
        return Err(ClaimError::invalid_time(
            text,
            "expected YYYY, YYYY-MM or YYYY-MM-DD",
        ));
    };

    let negative = caps.get(1).is_some_and(|sign| sign.as_str() == "-");
    let year: u64 = caps
        .get(2)
        .and_then(|digits| digits.as_str().parse().ok())
        .ok_or_else(|| ClaimError::invalid_time(text, "year is out of range"))?;
    let mut month = caps.get(3).and_then(|m| m.as_str().parse::<u8>().ok());
    let mut day = caps.get(4).and_then(|d| d.as_str().parse::<u8>().ok());

    if canonical {
        // `00` marks a component the precision leaves out.
        month = month.filter(|m| *m != 0);
        day = day.filter(|d| *d != 0);
        if month.is_none() && day.is_some() {
            return Err(ClaimError::invalid_time(text, "day given without a month"));
        }
    }

    if let Some(month) = month {
        if !(1..=12).contains(&month) {
            return Err(ClaimError::invalid_time(
                text,
                "month must be between 01 and 12",
            ));
        }
        if let Some(day) = day {
            let last = days_in_month(year, month);
            if day == 0 || day > last {
                return Err(ClaimError::invalid_time(
                    text,
                    format!("day must be between 01 and {last:02}"),
                ));
            }
        }
    }

    Ok(CalendarDate {
        negative,
        year,
        month,
        day,
    })
}

fn days_in_month(year: u64, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn is_leap_year(year: u64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

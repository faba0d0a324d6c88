//! Value coercion
//!
//! Raw rule values arrive as arbitrary JSON. They are read into the
//! field's type here, once, at compile time.

use crate::error::RuleError;
use crate::fields::{Unit, ValueType};
use crate::pattern::LikePattern;
use cadence_core::time::{format_timestamp, parse_timestamp};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::cmp::Ordering;

/// A rule value after coercion
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledValue {
    Text(String),
    /// Escaped LIKE pattern for the substring operators
    Pattern(LikePattern),
    Number(f64),
    Instant(DateTime<Utc>),
    /// Look-back window, anchored to the evaluation instant
    Window(Duration),
}

impl CompiledValue {
    /// Compare two values of the same kind
    pub fn partial_cmp_same_kind(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (CompiledValue::Number(a), CompiledValue::Number(b)) => a.partial_cmp(b),
            (CompiledValue::Instant(a), CompiledValue::Instant(b)) => Some(a.cmp(b)),
            (CompiledValue::Text(a), CompiledValue::Text(b)) => Some(a.cmp(b)),
            (CompiledValue::Window(a), CompiledValue::Window(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Human-readable form for error messages
    pub fn describe(&self) -> String {
        match self {
            CompiledValue::Text(text) => text.clone(),
            CompiledValue::Pattern(pattern) => pattern.to_string(),
            CompiledValue::Number(number) => number.to_string(),
            CompiledValue::Instant(instant) => format_timestamp(*instant),
            CompiledValue::Window(window) => format!("{}s", window.num_seconds()),
        }
    }
}

/// Read `raw` as a value of `value_type`
pub fn coerce(value_type: ValueType, raw: &Value) -> Result<CompiledValue, RuleError> {
    match value_type {
        ValueType::Text => text(raw).map(CompiledValue::Text),
        ValueType::Number => number(raw).map(CompiledValue::Number),
        ValueType::Date => instant(raw).map(CompiledValue::Instant),
    }
}

/// Read `raw` as a count of `unit` and convert it to a window
pub fn window(unit: Unit, raw: &Value) -> Result<CompiledValue, RuleError> {
    let count = number(raw)?;
    unit.duration(count)
        .map(CompiledValue::Window)
        .ok_or_else(|| RuleError::invalid_value(raw, "non-negative count"))
}

pub(crate) fn text(raw: &Value) -> Result<String, RuleError> {
    match raw {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(RuleError::invalid_value(raw, ValueType::Text.as_str())),
    }
}

fn number(raw: &Value) -> Result<f64, RuleError> {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|n| n.is_finite())
        .ok_or_else(|| RuleError::invalid_value(raw, ValueType::Number.as_str()))
}

fn instant(raw: &Value) -> Result<DateTime<Utc>, RuleError> {
    raw.as_str()
        .and_then(parse_timestamp)
        .ok_or_else(|| RuleError::invalid_value(raw, ValueType::Date.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn numbers_accept_json_numbers_and_numeric_strings() {
        assert_eq!(
            coerce(ValueType::Number, &json!(180)).unwrap(),
            CompiledValue::Number(180.0)
        );
        assert_eq!(
            coerce(ValueType::Number, &json!(" 179.9 ")).unwrap(),
            CompiledValue::Number(179.9)
        );
    }

    #[test]
    fn non_numeric_text_is_not_a_number() {
        let err = coerce(ValueType::Number, &json!("three minutes")).unwrap_err();
        assert_eq!(
            err,
            RuleError::InvalidValueType {
                value: "\"three minutes\"".to_string(),
                expected: "number".to_string(),
            }
        );
        assert!(coerce(ValueType::Number, &json!("NaN")).is_err());
        assert!(coerce(ValueType::Number, &json!(null)).is_err());
    }

    #[test]
    fn dates_parse_to_instants() {
        assert_eq!(
            coerce(ValueType::Date, &json!("2024-01-31")).unwrap(),
            CompiledValue::Instant(Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap())
        );
        assert!(coerce(ValueType::Date, &json!(1_706_659_200)).is_err());
        assert!(coerce(ValueType::Date, &json!("yesterday")).is_err());
    }

    #[test]
    fn text_accepts_numbers_verbatim() {
        assert_eq!(
            coerce(ValueType::Text, &json!(1999)).unwrap(),
            CompiledValue::Text("1999".to_string())
        );
        assert!(coerce(ValueType::Text, &json!(["nested"])).is_err());
    }

    #[test]
    fn windows_use_the_unit() {
        assert_eq!(
            window(Unit::Days, &json!(7)).unwrap(),
            CompiledValue::Window(Duration::days(7))
        );
        assert!(window(Unit::Days, &json!(-3)).is_err());
    }
}

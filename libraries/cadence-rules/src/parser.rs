//! Rule parser
//!
//! Turns a persisted `RuleRecord` into a typed `Rule`. Pure: no storage,
//! no clock. Checks run in a fixed order (field, operator, arity,
//! compatibility, range) so a rule always reports the same error.

use crate::error::RuleError;
use crate::fields::Field;
use crate::operators::Operator;
use crate::value::coerce;
use cadence_core::types::RuleRecord;
use serde_json::Value;
use std::cmp::Ordering;

/// A validated rule ready for compilation
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub id: Option<i64>,
    pub field: Field,
    pub operator: Operator,
    pub values: Vec<Value>,
}

pub fn parse_rule(record: &RuleRecord) -> Result<Rule, RuleError> {
    // Inline descriptors are resolved by name; the registry owns type and unit.
    let field = Field::resolve(record.field.field_name())?;
    let operator = Operator::resolve(&record.operator)?;

    if record.values.len() != operator.arity() {
        return Err(RuleError::InvalidArity {
            operator: operator.name(),
            expected: operator.arity(),
            actual: record.values.len(),
        });
    }

    if !operator.accepts(field) {
        return Err(RuleError::IncompatibleOperator {
            operator: operator.name(),
            field: field.name(),
            value_type: field.value_type(),
        });
    }

    if operator == Operator::IsBetween {
        check_range(field, &record.values[0], &record.values[1])?;
    }

    Ok(Rule {
        id: record.id,
        field,
        operator,
        values: record.values.clone(),
    })
}

fn check_range(field: Field, low: &Value, high: &Value) -> Result<(), RuleError> {
    let low = coerce(field.value_type(), low)?;
    let high = coerce(field.value_type(), high)?;

    match low.partial_cmp_same_kind(&high) {
        Some(Ordering::Greater) => Err(RuleError::InvalidRange {
            low: low.describe(),
            high: high.describe(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::ValueType;
    use cadence_core::types::{FieldDescriptor, FieldSpec};
    use serde_json::json;

    fn record(field: &str, operator: &str, values: Vec<Value>) -> RuleRecord {
        RuleRecord::new(FieldSpec::name(field), operator, values)
    }

    #[test]
    fn parses_a_bare_field_rule() {
        let rule = parse_rule(&record("song.length", "isBetween", vec![json!(180), json!(240)]))
            .unwrap();

        assert_eq!(rule.field, Field::SongLength);
        assert_eq!(rule.operator, Operator::IsBetween);
        assert_eq!(rule.values.len(), 2);
    }

    #[test]
    fn inline_descriptor_normalizes_to_the_same_field() {
        let inline = RuleRecord::new(
            FieldSpec::Descriptor(FieldDescriptor {
                name: "artist.name".to_string(),
                value_type: Some("text".to_string()),
                label: Some("Artist".to_string()),
                unit: None,
            }),
            "contains",
            vec![json!("Brien")],
        );
        let bare = record("artist.name", "contains", vec![json!("Brien")]);

        assert_eq!(parse_rule(&inline).unwrap(), parse_rule(&bare).unwrap());
    }

    #[test]
    fn unknown_names_are_reported_field_first() {
        assert_eq!(
            parse_rule(&record("mood", "vibes", vec![json!(1)])),
            Err(RuleError::UnknownField("mood".to_string()))
        );
        assert_eq!(
            parse_rule(&record("song.title", "vibes", vec![json!(1)])),
            Err(RuleError::UnknownOperator("vibes".to_string()))
        );
    }

    #[test]
    fn contains_on_a_number_is_incompatible() {
        assert_eq!(
            parse_rule(&record("song.length", "contains", vec![json!("3")])),
            Err(RuleError::IncompatibleOperator {
                operator: "contains",
                field: "song.length",
                value_type: ValueType::Number,
            })
        );
    }

    #[test]
    fn arity_is_checked_before_compatibility() {
        assert_eq!(
            parse_rule(&record("song.title", "isBetween", vec![json!("a")])),
            Err(RuleError::InvalidArity {
                operator: "isBetween",
                expected: 2,
                actual: 1,
            })
        );
        assert!(matches!(
            parse_rule(&record("song.title", "isBetween", vec![json!("a"), json!("b")])),
            Err(RuleError::IncompatibleOperator { .. })
        ));
    }

    #[test]
    fn wrong_value_count_is_an_arity_error() {
        assert_eq!(
            parse_rule(&record("song.track", "isBetween", vec![json!(1)])),
            Err(RuleError::InvalidArity {
                operator: "isBetween",
                expected: 2,
                actual: 1,
            })
        );
        assert_eq!(
            parse_rule(&record("song.title", "is", vec![])),
            Err(RuleError::InvalidArity {
                operator: "is",
                expected: 1,
                actual: 0,
            })
        );
    }

    #[test]
    fn descending_range_is_rejected_not_swapped() {
        assert_eq!(
            parse_rule(&record("song.length", "isBetween", vec![json!(240), json!(180)])),
            Err(RuleError::InvalidRange {
                low: "240".to_string(),
                high: "180".to_string(),
            })
        );
    }

    #[test]
    fn equal_bounds_are_a_valid_range() {
        assert!(parse_rule(&record("song.disc", "isBetween", vec![json!(2), json!(2)])).is_ok());
    }

    #[test]
    fn date_ranges_are_ordered_chronologically() {
        assert!(parse_rule(&record(
            "song.created_at",
            "isBetween",
            vec![json!("2024-01-01"), json!("2024-02-01")]
        ))
        .is_ok());

        assert!(matches!(
            parse_rule(&record(
                "song.created_at",
                "isBetween",
                vec![json!("2024-02-01"), json!("2024-01-01")]
            )),
            Err(RuleError::InvalidRange { .. })
        ));
    }

    #[test]
    fn unreadable_range_bound_is_a_value_error() {
        assert!(matches!(
            parse_rule(&record("song.length", "isBetween", vec![json!("short"), json!(10)])),
            Err(RuleError::InvalidValueType { .. })
        ));
    }
}

//! Predicate compiler
//!
//! One typed `Rule` in, one atomic `Predicate` out: values coerced to the
//! field's type, substring operands turned into escaped LIKE patterns,
//! window counts converted with the field's unit.

use crate::error::RuleError;
use crate::fields::{Field, Join};
use crate::operators::{Operand, Operator};
use crate::parser::Rule;
use crate::pattern::{LikePattern, MatchKind};
use crate::value::{self, CompiledValue};
use serde_json::Value;
use std::collections::BTreeSet;

/// An atomic, fully typed condition
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: Field,
    pub operator: Operator,
    pub values: Vec<CompiledValue>,
    /// Relations that must be joined for `field` to be readable
    pub joins: BTreeSet<Join>,
}

pub fn compile_rule(rule: &Rule) -> Result<Predicate, RuleError> {
    let values = rule
        .values
        .iter()
        .map(|raw| compile_value(rule.field, rule.operator, raw))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Predicate {
        field: rule.field,
        operator: rule.operator,
        values,
        joins: rule.field.join().into_iter().collect(),
    })
}

fn compile_value(field: Field, operator: Operator, raw: &Value) -> Result<CompiledValue, RuleError> {
    if operator.operand() == Operand::UnitCount {
        let unit = field.unit().ok_or(RuleError::IncompatibleOperator {
            operator: operator.name(),
            field: field.name(),
            value_type: field.value_type(),
        })?;
        return value::window(unit, raw);
    }

    let kind = match operator {
        Operator::Contains | Operator::NotContain => MatchKind::Contains,
        Operator::BeginsWith => MatchKind::Prefix,
        Operator::EndsWith => MatchKind::Suffix,
        _ => return value::coerce(field.value_type(), raw),
    };

    let literal = value::text(raw)?;
    Ok(CompiledValue::Pattern(LikePattern::new(kind, &literal)))
}

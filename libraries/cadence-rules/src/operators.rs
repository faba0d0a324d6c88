//! Operator registry
//!
//! Table-driven: every operator declares the value types it accepts, how
//! many values it takes and how those values are read. Validation consults
//! the table instead of branching on operator names.

use crate::error::RuleError;
use crate::fields::{Field, ValueType};
use std::fmt;

/// Comparison applied by a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operator {
    Is,
    IsNot,
    Contains,
    NotContain,
    BeginsWith,
    EndsWith,
    IsGreaterThan,
    IsLessThan,
    IsBetween,
    InLast,
    NotInLast,
}

/// How an operator reads its values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Values have the field's own type
    FieldValue,
    /// Values are a count of the field's unit (`inLast 7` on a days field)
    UnitCount,
}

struct OperatorDef {
    operator: Operator,
    name: &'static str,
    types: &'static [ValueType],
    arity: usize,
    operand: Operand,
}

const ALL_TYPES: &[ValueType] = &[ValueType::Text, ValueType::Number, ValueType::Date];
const TEXT: &[ValueType] = &[ValueType::Text];
const ORDERED: &[ValueType] = &[ValueType::Number, ValueType::Date];
const DATE: &[ValueType] = &[ValueType::Date];

// Indexed by `Operator as usize`; keep in declaration order.
static REGISTRY: [OperatorDef; 11] = [
    OperatorDef {
        operator: Operator::Is,
        name: "is",
        types: ALL_TYPES,
        arity: 1,
        operand: Operand::FieldValue,
    },
    OperatorDef {
        operator: Operator::IsNot,
        name: "isNot",
        types: ALL_TYPES,
        arity: 1,
        operand: Operand::FieldValue,
    },
    OperatorDef {
        operator: Operator::Contains,
        name: "contains",
        types: TEXT,
        arity: 1,
        operand: Operand::FieldValue,
    },
    OperatorDef {
        operator: Operator::NotContain,
        name: "notContain",
        types: TEXT,
        arity: 1,
        operand: Operand::FieldValue,
    },
    OperatorDef {
        operator: Operator::BeginsWith,
        name: "beginsWith",
        types: TEXT,
        arity: 1,
        operand: Operand::FieldValue,
    },
    OperatorDef {
        operator: Operator::EndsWith,
        name: "endsWith",
        types: TEXT,
        arity: 1,
        operand: Operand::FieldValue,
    },
    OperatorDef {
        operator: Operator::IsGreaterThan,
        name: "isGreaterThan",
        types: ORDERED,
        arity: 1,
        operand: Operand::FieldValue,
    },
    OperatorDef {
        operator: Operator::IsLessThan,
        name: "isLessThan",
        types: ORDERED,
        arity: 1,
        operand: Operand::FieldValue,
    },
    OperatorDef {
        operator: Operator::IsBetween,
        name: "isBetween",
        types: ORDERED,
        arity: 2,
        operand: Operand::FieldValue,
    },
    OperatorDef {
        operator: Operator::InLast,
        name: "inLast",
        types: DATE,
        arity: 1,
        operand: Operand::UnitCount,
    },
    OperatorDef {
        operator: Operator::NotInLast,
        name: "notInLast",
        types: DATE,
        arity: 1,
        operand: Operand::UnitCount,
    },
];

impl Operator {
    pub fn resolve(name: &str) -> Result<Self, RuleError> {
        REGISTRY
            .iter()
            .find(|def| def.name == name)
            .map(|def| def.operator)
            .ok_or_else(|| RuleError::UnknownOperator(name.to_string()))
    }

    pub fn all() -> impl Iterator<Item = Operator> {
        REGISTRY.iter().map(|def| def.operator)
    }

    fn def(self) -> &'static OperatorDef {
        &REGISTRY[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.def().name
    }

    pub fn types(self) -> &'static [ValueType] {
        self.def().types
    }

    pub fn arity(self) -> usize {
        self.def().arity
    }

    pub fn operand(self) -> Operand {
        self.def().operand
    }

    /// Whether the operator can be applied to `field`.
    ///
    /// Unit-count operators additionally need the field to carry a unit.
    pub fn accepts(self, field: Field) -> bool {
        if !self.types().contains(&field.value_type()) {
            return false;
        }

        match self.operand() {
            Operand::FieldValue => true,
            Operand::UnitCount => field.unit().is_some(),
        }
    }

    /// Operators that also match rows where the field is absent
    pub fn is_negated(self) -> bool {
        matches!(
            self,
            Operator::IsNot | Operator::NotContain | Operator::NotInLast
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_indexed_by_discriminant() {
        for (index, def) in REGISTRY.iter().enumerate() {
            assert_eq!(def.operator as usize, index, "{} is out of order", def.name);
        }
    }

    #[test]
    fn names_resolve_exactly() {
        assert_eq!(Operator::resolve("isBetween").unwrap(), Operator::IsBetween);
        assert_eq!(Operator::resolve("notContain").unwrap(), Operator::NotContain);
        assert_eq!(
            Operator::resolve("isbetween"),
            Err(RuleError::UnknownOperator("isbetween".to_string()))
        );
    }

    #[test]
    fn text_operators_reject_numbers() {
        assert!(Operator::Contains.accepts(Field::ArtistName));
        assert!(!Operator::Contains.accepts(Field::SongLength));
        assert!(!Operator::BeginsWith.accepts(Field::SongCreatedAt));
    }

    #[test]
    fn ordering_operators_reject_text() {
        assert!(Operator::IsBetween.accepts(Field::SongLength));
        assert!(Operator::IsGreaterThan.accepts(Field::InteractionUpdatedAt));
        assert!(!Operator::IsLessThan.accepts(Field::SongTitle));
    }

    #[test]
    fn window_operators_need_dated_fields() {
        assert!(Operator::InLast.accepts(Field::SongCreatedAt));
        assert!(Operator::NotInLast.accepts(Field::InteractionUpdatedAt));
        assert!(!Operator::InLast.accepts(Field::SongLength));
        assert!(!Operator::InLast.accepts(Field::SongTitle));
    }

    #[test]
    fn arities() {
        for operator in Operator::all() {
            let expected = if operator == Operator::IsBetween { 2 } else { 1 };
            assert_eq!(operator.arity(), expected, "{operator}");
        }
    }
}

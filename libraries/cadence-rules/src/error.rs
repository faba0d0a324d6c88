/// Rule validation and compilation errors
use crate::fields::ValueType;
use std::fmt;
use thiserror::Error;

/// Why a single rule was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// Field name outside the registry
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Operator name outside the registry
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    /// Operator does not support the field's value type
    #[error("Operator {operator} cannot be applied to {value_type} field {field}")]
    IncompatibleOperator {
        operator: &'static str,
        field: &'static str,
        value_type: ValueType,
    },

    /// Wrong number of values for the operator
    #[error("Operator {operator} takes {expected} value(s), got {actual}")]
    InvalidArity {
        operator: &'static str,
        expected: usize,
        actual: usize,
    },

    /// `isBetween` bounds given in descending order
    #[error("Range lower bound {low} is greater than upper bound {high}")]
    InvalidRange { low: String, high: String },

    /// A value could not be read as the field's type
    #[error("Value {value} is not a valid {expected}")]
    InvalidValueType { value: String, expected: String },

    /// Field exists but results cannot be ordered by it
    #[error("Cannot sort by field: {0}")]
    UnsortableField(String),
}

impl RuleError {
    pub(crate) fn invalid_value(value: &serde_json::Value, expected: impl Into<String>) -> Self {
        Self::InvalidValueType {
            value: value.to_string(),
            expected: expected.into(),
        }
    }
}

/// A rejected rule together with its position in the playlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    /// Index of the rule group (0-based)
    pub group: usize,
    /// Index of the rule inside its group (0-based)
    pub rule: usize,
    /// Persisted rule id, when the client stored one
    pub rule_id: Option<i64>,
    pub kind: RuleError,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group {}, rule {}", self.group, self.rule)?;
        if let Some(id) = self.rule_id {
            write!(f, " (id {id})")?;
        }
        write!(f, ": {}", self.kind)
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Every rule that failed to compile, in playlist order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileErrors(pub Vec<CompileError>);

impl CompileErrors {
    pub fn errors(&self) -> &[CompileError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid rule(s)", self.0.len())?;
        for error in &self.0 {
            write!(f, "; {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileErrors {}

impl From<CompileErrors> for cadence_core::CadenceError {
    fn from(errors: CompileErrors) -> Self {
        cadence_core::CadenceError::InvalidRules(errors.to_string())
    }
}

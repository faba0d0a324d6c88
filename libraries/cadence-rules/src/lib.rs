//! Cadence Rules
//!
//! Smart playlist rule compiler. Persisted rule groups go in, a validated
//! boolean expression over the catalogue comes out:
//!
//! ```text
//! RuleGroupRecord[] → parse_rule → compile_rule → combine → CompiledExpression
//! ```
//!
//! Nothing here touches storage or the clock, so any number of playlists can
//! be compiled concurrently. Executing an expression is the job of a
//! [`SongCatalogue`] implementation (see `cadence-storage`).
//!
//! # Example
//!
//! ```rust
//! use cadence_core::types::{FieldSpec, RuleGroupRecord, RuleRecord, UserId};
//! use cadence_rules::{compile, Join};
//! use serde_json::json;
//!
//! let groups = vec![RuleGroupRecord::new(vec![
//!     RuleRecord::new(FieldSpec::name("artist.name"), "contains", vec![json!("Brien")]),
//!     RuleRecord::new(FieldSpec::name("interaction.play_count"), "isGreaterThan", vec![json!(3)]),
//! ])];
//!
//! let (expression, errors) = compile(&groups, UserId::new(1));
//! assert!(errors.is_empty());
//! assert!(expression.requires(Join::Interaction));
//! ```

#![forbid(unsafe_code)]

pub mod cache;
pub mod compiler;
pub mod error;
pub mod evaluator;
pub mod expression;
pub mod fields;
pub mod operators;
pub mod parser;
pub mod pattern;
pub mod query;
pub mod value;

pub use cache::{ContentHash, ExpressionCache};
pub use compiler::{compile_rule, Predicate};
pub use error::{CompileError, CompileErrors, RuleError};
pub use evaluator::SongCatalogue;
pub use expression::{combine, CompiledExpression, Conjunction};
pub use fields::{Field, Join, Unit, ValueType};
pub use operators::{Operand, Operator};
pub use parser::{parse_rule, Rule};
pub use pattern::{fold_case, LikePattern, MatchKind, LIKE_ESCAPE};
pub use query::{Pagination, SongSort, SortDirection};
pub use value::CompiledValue;

use cadence_core::types::{RuleGroupRecord, UserId};

/// Compile every rule, collecting all failures instead of stopping at the
/// first.
///
/// A group containing an invalid rule compiles to an empty conjunction, so
/// the returned expression can never match more than the valid rules
/// would. Callers must not evaluate it when `errors` is non-empty; use
/// [`compile_strict`] on evaluation paths.
pub fn compile(groups: &[RuleGroupRecord], user_id: UserId) -> (CompiledExpression, Vec<CompileError>) {
    let mut errors = Vec::new();
    let mut conjunctions = Vec::with_capacity(groups.len());

    for (group_index, group) in groups.iter().enumerate() {
        let mut predicates = Vec::with_capacity(group.rules.len());
        let mut group_valid = true;

        for (rule_index, record) in group.rules.iter().enumerate() {
            match parse_rule(record).and_then(|rule| compile_rule(&rule)) {
                Ok(predicate) => predicates.push(predicate),
                Err(kind) => {
                    tracing::warn!(
                        group = group_index,
                        rule = rule_index,
                        field = record.field.field_name(),
                        operator = %record.operator,
                        error = %kind,
                        "rejected smart playlist rule"
                    );
                    group_valid = false;
                    errors.push(CompileError {
                        group: group_index,
                        rule: rule_index,
                        rule_id: record.id,
                        kind,
                    });
                }
            }
        }

        if !group_valid {
            predicates.clear();
        }
        conjunctions.push(Conjunction::new(predicates));
    }

    let expression = combine(user_id, conjunctions);
    tracing::debug!(
        user = %user_id,
        groups = expression.groups.len(),
        predicates = expression.predicate_count(),
        joins = expression.joins.len(),
        errors = errors.len(),
        "compiled smart playlist rules"
    );

    (expression, errors)
}

/// Compile, failing with the whole batch of errors if any rule is invalid
pub fn compile_strict(
    groups: &[RuleGroupRecord],
    user_id: UserId,
) -> Result<CompiledExpression, CompileErrors> {
    let (expression, errors) = compile(groups, user_id);
    if errors.is_empty() {
        Ok(expression)
    } else {
        Err(CompileErrors(errors))
    }
}

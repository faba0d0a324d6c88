//! Group combinator
//!
//! Purely structural: predicates inside a group are AND-ed, groups are
//! OR-ed, and the joins every predicate needs are merged into one set.
//! An empty group or an empty playlist matches nothing.

use crate::compiler::Predicate;
use crate::fields::Join;
use cadence_core::types::UserId;
use std::collections::BTreeSet;

/// Predicates that must all hold; empty means "match nothing"
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Conjunction {
    pub predicates: Vec<Predicate>,
}

impl Conjunction {
    pub fn new(predicates: Vec<Predicate>) -> Self {
        Self { predicates }
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

/// OR of ANDs of atomic predicates, plus everything needed to run it
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    /// User whose interaction rows the `Join::Interaction` join reads
    pub user_id: UserId,
    pub groups: Vec<Conjunction>,
    /// Each relation once, in a stable order
    pub joins: BTreeSet<Join>,
}

impl CompiledExpression {
    /// True when no row can match, so evaluation may skip the store
    pub fn matches_nothing(&self) -> bool {
        self.groups.iter().all(Conjunction::is_empty)
    }

    pub fn requires(&self, join: Join) -> bool {
        self.joins.contains(&join)
    }

    pub fn predicate_count(&self) -> usize {
        self.groups.iter().map(|group| group.predicates.len()).sum()
    }
}

/// Assemble groups of predicates into one expression
pub fn combine(user_id: UserId, groups: Vec<Conjunction>) -> CompiledExpression {
    let joins = groups
        .iter()
        .flat_map(|group| group.predicates.iter())
        .flat_map(|predicate| predicate.joins.iter().copied())
        .collect();

    CompiledExpression {
        user_id,
        groups,
        joins,
    }
}

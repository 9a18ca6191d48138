//! # The Compiled Mapper
//!
//! [`Mapper`] is the immutable, build-once artifact. It owns the validated,
//! ordered rule list and the finalized comparer table, and exposes the two
//! compiled operations:
//!
//! - [`map`](Mapper::map) — conditional copy, mutating only differing members;
//! - [`diff`](Mapper::diff) — pure report of the members that would change.
//!
//! Both walk the same rules in declaration order and evaluate the same
//! per-rule predicate, so "the diff is empty" and "map reports unchanged"
//! can never disagree for the same inputs.
//!
//! ## Concurrency
//!
//! The mapper holds no per-call state. A single instance may be reused
//! across unrelated source/target pairs indefinitely, and shared across
//! threads: `map` and `diff` take `&self`, and exclusive access to the
//! target is already expressed by `&mut T`. The engine performs no locking;
//! serializing concurrent mutation of one target instance is the caller's
//! job, and in safe code the borrow checker makes it so.

use crate::comparer::ComparerTable;
use crate::diff::FieldDiff;
use crate::validation::ValidatedRule;

/// The compiled field-mapping artifact for a source type `S` and target
/// type `T`.
///
/// Produced exclusively by [`MapperBuilder::build`](crate::MapperBuilder::build);
/// immutable and reusable thereafter. See the builder for the declaration
/// surface.
pub struct Mapper<S, T> {
    rules: Vec<ValidatedRule<S, T>>,
    comparers: ComparerTable,
}

impl<S, T> Mapper<S, T> {
    pub(crate) fn new(rules: Vec<ValidatedRule<S, T>>, comparers: ComparerTable) -> Self {
        Self { rules, comparers }
    }

    /// Conditionally copy every declared member from `source` into `target`.
    ///
    /// Rules run in declaration order. For each, the change predicate
    /// (custom strategy's negated equivalence, or natural inequality) is
    /// evaluated between the member's current value and the freshly
    /// evaluated source expression; on a difference the member is assigned.
    /// Every rule is checked exactly once — there is no short-circuiting, so
    /// declaration order never affects the returned flag.
    ///
    /// Returns `true` iff at least one member was assigned.
    pub fn map(&self, source: &S, target: &mut T) -> bool {
        let mut changed = false;
        for rule in &self.rules {
            if (rule.predicate)(source, target, &self.comparers) {
                tracing::trace!(field = %rule.field, "member differs, assigning");
                (rule.assign)(source, target);
                changed = true;
            }
        }
        changed
    }

    /// Report which declared members differ, without mutating anything.
    ///
    /// Evaluates exactly the predicates `map` evaluates, in the same order;
    /// the report is empty iff `map` would return `false` for the same pair.
    pub fn diff(&self, source: &S, target: &T) -> Vec<FieldDiff> {
        let mut report = Vec::new();
        self.diff_into(source, target, &mut report);
        report
    }

    /// Like [`diff`](Mapper::diff), appending into a caller-supplied
    /// accumulator instead of allocating one per call.
    pub fn diff_into(&self, source: &S, target: &T, report: &mut Vec<FieldDiff>) {
        for rule in &self.rules {
            if (rule.predicate)(source, target, &self.comparers) {
                report.push((rule.capture)(source, target));
            }
        }
    }

    /// Number of compiled rules.
    pub fn rules_len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the mapper was built from an empty rule list.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Declared target member names, in execution order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.field.as_str())
    }
}

impl<S, T> std::fmt::Debug for Mapper<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapper")
            .field("rules", &self.rules.len())
            .field("comparers", &self.comparers)
            .finish()
    }
}

//! # Rule Validation — Conversion Policy and Build-Time Checks
//!
//! Declaring a rule never fails; every problem is reported by `build()`,
//! batched across the whole rule list. This module owns both halves of that
//! contract:
//!
//! - [`select_conversion`] classifies the relationship between the source
//!   expression's value type and the target member's type. It runs at the
//!   declaration site, the only place both concrete types are still visible,
//!   and its verdict is carried on the pending rule as data.
//! - [`validate_rules`] runs at build time over all pending rules, enforcing
//!   accessor well-formedness, writability, and the recorded conversion
//!   verdicts, and either returns the validated rule list or every issue
//!   found.
//!
//! ## Conversion Policy
//!
//! Checked in order:
//!
//! 1. exact — the source value type *is* the member type; accepted unchanged.
//! 2. nullable-wrap — the member is `Option<V>` and the source produces `V`;
//!    accepted, with the `Some` wrap inserted before comparison and
//!    assignment. Promoting a plain value into its optional wrapper is
//!    always safe.
//! 3. anything else — rejected. The engine never inserts a conversion that
//!    can lose precision or truncate; the caller embeds the cast in the
//!    source expression (`|s| s.ratio as i32`), after which the expression
//!    produces the member's exact type and case 1 applies.

use std::any::{type_name, Any};
use std::sync::Arc;

use crate::error::{BuildError, RuleIssue};
use crate::rule::{PendingRule, RuleBody, SourceFn};

/// Outcome of classifying one rule's source-to-member type relationship.
///
/// The accepted variants carry the evaluator already reified to produce the
/// member's exact type, so nothing downstream ever converts per call.
pub(crate) enum Conversion<S, W> {
    /// Source and member types are identical.
    Exact(SourceFn<S, W>),
    /// Member is the `Option` wrapper of the source type; the evaluator has
    /// been lifted through `Some`.
    Wrapped(SourceFn<S, W>),
    /// No accepted conversion path; carries both type names for reporting.
    Rejected {
        source_type: &'static str,
        target_type: &'static str,
    },
}

impl<S, W> Conversion<S, W> {
    /// Policy name, for build-time logging.
    pub(crate) fn policy(&self) -> &'static str {
        match self {
            Self::Exact(_) => "exact",
            Self::Wrapped(_) => "nullable-wrap",
            Self::Rejected { .. } => "rejected",
        }
    }
}

/// Classify the source expression against the target member type `W`.
///
/// Type equality is decided by `TypeId`, observed through boxed-closure
/// downcasts: the evaluator (or its `Some`-lifted form) downcasts to
/// `SourceFn<S, W>` exactly when its value type is `W`. No `unsafe`, and the
/// accepted evaluator is fully typed from here on.
pub(crate) fn select_conversion<S, V, W>(eval: SourceFn<S, V>) -> Conversion<S, W>
where
    S: 'static,
    V: 'static,
    W: 'static,
{
    let rejected = Conversion::Rejected {
        source_type: type_name::<V>(),
        target_type: type_name::<W>(),
    };

    let any: Box<dyn Any> = Box::new(eval);
    let any = match any.downcast::<SourceFn<S, W>>() {
        Ok(exact) => return Conversion::Exact(*exact),
        Err(other) => other,
    };

    // Not exact; recover the original evaluator (this restores the type the
    // box was built from and cannot miss) and try the optional wrapper.
    let eval = match any.downcast::<SourceFn<S, V>>() {
        Ok(eval) => *eval,
        Err(_) => return rejected,
    };
    let lifted: SourceFn<S, Option<V>> = Arc::new(move |s| Some((*eval)(s)));
    match (Box::new(lifted) as Box<dyn Any>).downcast::<SourceFn<S, W>>() {
        Ok(wrapped) => Conversion::Wrapped(*wrapped),
        Err(_) => rejected,
    }
}

/// Whether an accessor name denotes a single addressable member: one plain
/// identifier, no path segments.
fn is_member_ident(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A rule that passed every build-time check, ready for execution.
pub(crate) struct ValidatedRule<S, T> {
    pub(crate) field: String,
    pub(crate) predicate: crate::rule::PredicateFn<S, T>,
    pub(crate) assign: crate::rule::AssignFn<S, T>,
    pub(crate) capture: crate::rule::CaptureFn<S, T>,
}

/// Validate the whole pending rule list.
///
/// Per rule, in order: accessor well-formedness, writability, recorded
/// conversion verdict. Issues across all rules are collected and returned
/// together; a validated list is produced only when there are none.
pub(crate) fn validate_rules<S, T>(
    pending: Vec<PendingRule<S, T>>,
) -> Result<Vec<ValidatedRule<S, T>>, BuildError> {
    let mut issues = Vec::new();
    let mut validated = Vec::with_capacity(pending.len());

    for rule in pending {
        let PendingRule {
            field,
            writable,
            body,
        } = rule;

        if !is_member_ident(&field) {
            issues.push(RuleIssue::MalformedAccessor {
                field: field.clone(),
            });
        }
        if !writable {
            issues.push(RuleIssue::WriteTarget {
                field: field.clone(),
            });
        }

        match body {
            RuleBody::TypeMismatch {
                source_type,
                target_type,
            } => {
                issues.push(RuleIssue::IncompatibleType {
                    field,
                    source_type,
                    target_type,
                });
            }
            RuleBody::Ready(kernel) => {
                // A writable rule always carries its assignment kernel; the
                // read-only case was recorded above.
                if let Some(assign) = kernel.assign {
                    validated.push(ValidatedRule {
                        field,
                        predicate: kernel.predicate,
                        assign,
                        capture: kernel.capture,
                    });
                }
            }
        }
    }

    if issues.is_empty() {
        Ok(validated)
    } else {
        Err(BuildError::new(issues))
    }
}

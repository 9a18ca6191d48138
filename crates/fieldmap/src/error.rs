//! # Error Types — Build-Time Rule Diagnostics
//!
//! All rule problems are deferred to `build()`: declaring a rule never fails,
//! and a single build reports every invalid rule at once instead of stopping
//! at the first one. Each issue names the target member and, for type
//! problems, both type names, so the caller can fix the declaration without
//! re-running the build once per mistake.
//!
//! There is no retry path anywhere in this engine. Every error is a
//! declaration mistake, and recovery is always "fix the rule."

use thiserror::Error;

/// One invalid rule found while building a mapper.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleIssue {
    /// The target accessor carries no setter, so the member cannot be
    /// assigned (a computed or otherwise read-only member).
    #[error("target member `{field}` is not assignable")]
    WriteTarget {
        /// Name of the target member the rule was declared against.
        field: String,
    },

    /// The source expression's value type is neither the target member's
    /// type nor the type the member's `Option` wraps. The engine never
    /// inserts a narrowing conversion; the cast belongs inside the source
    /// expression, where the caller takes responsibility for it.
    #[error(
        "cannot map source type `{source_type}` into target member `{field}` \
         of type `{target_type}`; embed an explicit cast in the source expression"
    )]
    IncompatibleType {
        /// Name of the target member the rule was declared against.
        field: String,
        /// Type produced by the source expression.
        source_type: &'static str,
        /// Type of the target member.
        target_type: &'static str,
    },

    /// The accessor name does not denote a single addressable member.
    #[error("accessor `{field}` does not name a single addressable member")]
    MalformedAccessor {
        /// The offending accessor name as declared.
        field: String,
    },
}

impl RuleIssue {
    /// Name of the target member this issue was raised for.
    pub fn field(&self) -> &str {
        match self {
            Self::WriteTarget { field }
            | Self::IncompatibleType { field, .. }
            | Self::MalformedAccessor { field } => field,
        }
    }
}

/// Failure of a `build()` call.
///
/// Carries every [`RuleIssue`] found across the whole rule list. No partial
/// mapper is ever produced: either all rules validate and the caller gets a
/// usable artifact, or none do and the caller gets this.
#[derive(Debug, Error)]
#[error("mapper build failed with {} invalid rule(s): {}", .issues.len(), render_issues(.issues))]
pub struct BuildError {
    issues: Vec<RuleIssue>,
}

impl BuildError {
    pub(crate) fn new(issues: Vec<RuleIssue>) -> Self {
        Self { issues }
    }

    /// All issues found during the failed build, in rule declaration order.
    pub fn issues(&self) -> &[RuleIssue] {
        &self.issues
    }
}

fn render_issues(issues: &[RuleIssue]) -> String {
    issues
        .iter()
        .map(RuleIssue::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

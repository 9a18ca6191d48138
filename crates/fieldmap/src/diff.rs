//! # Field Difference Reports
//!
//! [`FieldDiff`] is the one-row report produced by the pure diff operation:
//! which declared member differs, what the target currently holds, and what
//! the source would write. Values are carried as `serde_json::Value` so a
//! single report type covers heterogeneous member types; report rows derive
//! `Serialize`/`Deserialize` and are safe to log or ship as-is.
//!
//! Rows are produced in rule declaration order and are never persisted by the
//! engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One member that would change if the target were mapped from the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDiff {
    /// Name of the target member.
    pub field: String,
    /// The target's current value, before any mutation.
    pub target: Value,
    /// The freshly evaluated source value that would be written.
    pub source: Value,
}

impl FieldDiff {
    /// Build a report row from the live values on both sides.
    ///
    /// Values that cannot be represented as JSON collapse to `null`; the row
    /// itself is still emitted so the member is never silently dropped from
    /// the report.
    pub fn new(field: impl Into<String>, target: &impl Serialize, source: &impl Serialize) -> Self {
        Self {
            field: field.into(),
            target: serde_json::to_value(target).unwrap_or(Value::Null),
            source: serde_json::to_value(source).unwrap_or(Value::Null),
        }
    }
}

impl std::fmt::Display for FieldDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} -> {}", self.field, self.target, self.source)
    }
}

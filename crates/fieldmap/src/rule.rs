//! # Rules and Target Accessors
//!
//! A rule is one declared correspondence between a target member and a
//! source-derived value. The declaration surface stores plain functions —
//! a getter/setter pair for the target member and an evaluator for the
//! source expression — written directly against the two record types; there
//! is no deferred expression rewriting anywhere in the engine.
//!
//! At the declaration site the concrete member type is still visible, so the
//! rule's three kernels (change predicate, assignment, diff capture) are
//! monomorphized here and stored type-erased. Everything after declaration
//! works with the erased kernels.

use std::sync::Arc;

use serde::Serialize;

use crate::comparer::ComparerTable;
use crate::diff::FieldDiff;

/// Getter half of an accessor: produces the member's current value.
pub(crate) type GetFn<T, W> = Arc<dyn Fn(&T) -> W + Send + Sync>;

/// Setter half of an accessor: overwrites the member.
pub(crate) type SetFn<T, W> = Arc<dyn Fn(&mut T, W) + Send + Sync>;

/// A reified source expression, already adjusted to produce the target
/// member's exact type (see [`crate::validation`]).
pub(crate) type SourceFn<S, V> = Arc<dyn Fn(&S) -> V + Send + Sync>;

/// Erased change predicate: "would this rule assign?".
pub(crate) type PredicateFn<S, T> = Box<dyn Fn(&S, &T, &ComparerTable) -> bool + Send + Sync>;

/// Erased assignment: write the fresh source value into the target member.
pub(crate) type AssignFn<S, T> = Box<dyn Fn(&S, &mut T) + Send + Sync>;

/// Erased diff capture: report both sides of a differing member.
pub(crate) type CaptureFn<S, T> = Box<dyn Fn(&S, &T) -> FieldDiff + Send + Sync>;

/// Names one member of the target record and how to reach it.
///
/// The getter returns the member by value (clone it in the closure for
/// non-`Copy` members). The setter is optional: an accessor without one
/// denotes a computed or otherwise read-only member, and any rule declared
/// against it fails the build with a write-target issue.
///
/// The [`field!`](crate::field) macro builds a read-write accessor for an
/// ordinary named field.
pub struct Accessor<T, W> {
    name: String,
    get: GetFn<T, W>,
    set: Option<SetFn<T, W>>,
}

impl<T, W> Accessor<T, W> {
    /// Accessor for an assignable member.
    pub fn read_write(
        name: impl Into<String>,
        get: impl Fn(&T) -> W + Send + Sync + 'static,
        set: impl Fn(&mut T, W) + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            get: Arc::new(get),
            set: Some(Arc::new(set)),
        }
    }

    /// Accessor for a member that cannot be assigned.
    ///
    /// Useful only for surfacing the writability error deliberately; the
    /// build rejects rules declared against read-only accessors.
    pub fn read_only(name: impl Into<String>, get: impl Fn(&T) -> W + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            get: Arc::new(get),
            set: None,
        }
    }

    /// The declared member name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the accessor carries a setter.
    pub fn is_writable(&self) -> bool {
        self.set.is_some()
    }

    pub(crate) fn into_parts(self) -> (String, GetFn<T, W>, Option<SetFn<T, W>>) {
        (self.name, self.get, self.set)
    }
}

/// Build a read-write [`Accessor`] for a named field of a record type.
///
/// The getter clones the field, so the field type must be `Clone`.
///
/// ```
/// use fieldmap::{field, Accessor};
///
/// struct Account {
///     balance: i64,
/// }
///
/// let accessor: Accessor<Account, i64> = field!(Account, balance);
/// assert_eq!(accessor.name(), "balance");
/// assert!(accessor.is_writable());
/// ```
#[macro_export]
macro_rules! field {
    ($owner:ty, $member:ident) => {
        $crate::Accessor::read_write(
            stringify!($member),
            |owner: &$owner| owner.$member.clone(),
            |owner: &mut $owner, value| owner.$member = value,
        )
    };
}

/// The three compiled kernels of one rule, monomorphized at the declaration
/// site and erased over the record types.
pub(crate) struct RuleKernel<S, T> {
    pub(crate) predicate: PredicateFn<S, T>,
    pub(crate) assign: Option<AssignFn<S, T>>,
    pub(crate) capture: CaptureFn<S, T>,
}

impl<S, T> RuleKernel<S, T>
where
    S: 'static,
    T: 'static,
{
    /// Kernels for a rule using the member type's natural equality.
    pub(crate) fn with_natural_equality<W>(
        field: &str,
        get: GetFn<T, W>,
        set: Option<SetFn<T, W>>,
        source: SourceFn<S, W>,
    ) -> Self
    where
        W: PartialEq + Serialize + 'static,
    {
        let predicate: PredicateFn<S, T> = {
            let get = Arc::clone(&get);
            let source = Arc::clone(&source);
            Box::new(move |s, t, _| (*get)(t) != (*source)(s))
        };
        Self {
            assign: Self::assignment(set, Arc::clone(&source)),
            capture: Self::capture(field, get, source),
            predicate,
        }
    }

    /// Kernels for a rule whose change check goes through a comparer slot.
    pub(crate) fn with_comparer<V>(
        field: &str,
        get: GetFn<T, V>,
        set: Option<SetFn<T, V>>,
        source: SourceFn<S, V>,
        slot: usize,
    ) -> Self
    where
        V: Serialize + 'static,
    {
        let predicate: PredicateFn<S, T> = {
            let get = Arc::clone(&get);
            let source = Arc::clone(&source);
            Box::new(move |s, t, comparers| !comparers.equivalent(slot, &(*get)(t), &(*source)(s)))
        };
        Self {
            assign: Self::assignment(set, Arc::clone(&source)),
            capture: Self::capture(field, get, source),
            predicate,
        }
    }

    fn assignment<W: 'static>(
        set: Option<SetFn<T, W>>,
        source: SourceFn<S, W>,
    ) -> Option<AssignFn<S, T>> {
        set.map(|set| -> AssignFn<S, T> { Box::new(move |s, t| (*set)(t, (*source)(s))) })
    }

    fn capture<W>(field: &str, get: GetFn<T, W>, source: SourceFn<S, W>) -> CaptureFn<S, T>
    where
        W: Serialize + 'static,
    {
        let field = field.to_string();
        Box::new(move |s, t| FieldDiff::new(field.clone(), &(*get)(t), &(*source)(s)))
    }
}

/// A declared rule awaiting validation.
///
/// Either the kernels were produced (the types lined up and the closures are
/// ready to run), or the declaration recorded the type mismatch to be
/// reported by the build.
pub(crate) struct PendingRule<S, T> {
    pub(crate) field: String,
    pub(crate) writable: bool,
    pub(crate) body: RuleBody<S, T>,
}

pub(crate) enum RuleBody<S, T> {
    Ready(RuleKernel<S, T>),
    TypeMismatch {
        source_type: &'static str,
        target_type: &'static str,
    },
}

//! # Mapper Builder — The Declaration Surface
//!
//! Rules are accumulated fluently and nothing is checked until `build()`:
//! a single build call reports every invalid rule at once rather than
//! failing on the first bad declaration. The builder owns the pending rule
//! list and the comparer registry, and `build(self)` consumes it.
//!
//! ## Build-Once
//!
//! The open/frozen lifecycle is encoded in ownership rather than a runtime
//! flag. `build` takes `self`, so adding a rule after building — or building
//! twice — is a compile error, not a runtime one:
//!
//! ```compile_fail
//! use fieldmap::{field, MapperBuilder};
//!
//! struct Reading { celsius: i32 }
//! struct Display { celsius: i32 }
//!
//! let builder = MapperBuilder::<Reading, Display>::new()
//!     .bind(field!(Display, celsius), |r: &Reading| r.celsius);
//! let first = builder.build();
//! let second = builder.build(); // ERROR: use of moved value `builder`
//! ```

use std::sync::Arc;

use serde::Serialize;

use crate::comparer::{ComparerRegistry, FieldComparer};
use crate::error::BuildError;
use crate::mapper::Mapper;
use crate::rule::{Accessor, PendingRule, RuleBody, RuleKernel, SourceFn};
use crate::validation::{select_conversion, validate_rules, Conversion};

/// Accumulates field-mapping rules for a source type `S` and target type `T`,
/// then compiles them into an immutable [`Mapper`].
///
/// ```
/// use fieldmap::{field, MapperBuilder};
///
/// struct Upstream {
///     age: i32,
/// }
///
/// #[derive(Default)]
/// struct Profile {
///     age: i32,
/// }
///
/// let mapper = MapperBuilder::<Upstream, Profile>::new()
///     .bind(field!(Profile, age), |u: &Upstream| u.age)
///     .build()
///     .expect("rules validate");
///
/// let source = Upstream { age: 42 };
/// let mut target = Profile::default();
/// assert!(mapper.map(&source, &mut target));
/// assert_eq!(target.age, 42);
/// assert!(!mapper.map(&source, &mut target));
/// ```
pub struct MapperBuilder<S, T> {
    rules: Vec<PendingRule<S, T>>,
    registry: ComparerRegistry,
}

impl<S, T> MapperBuilder<S, T>
where
    S: 'static,
    T: 'static,
{
    /// Start an empty rule list.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            registry: ComparerRegistry::new(),
        }
    }

    /// Declare that the target member behind `target` is mapped from
    /// `source`, compared with the member type's natural equality.
    ///
    /// The source value type `V` and the member type `W` may differ; the
    /// relationship is classified now and enforced by [`build`]: identical
    /// types pass through, `W == Option<V>` inserts the `Some` wrap, and
    /// anything else is reported as an incompatible-type issue. Declaration
    /// itself never fails.
    ///
    /// [`build`]: MapperBuilder::build
    pub fn bind<W, V, F>(mut self, target: Accessor<T, W>, source: F) -> Self
    where
        W: PartialEq + Serialize + 'static,
        V: 'static,
        F: Fn(&S) -> V + Send + Sync + 'static,
    {
        let (field, get, set) = target.into_parts();
        let writable = set.is_some();
        let eval: SourceFn<S, V> = Arc::new(source);

        let conversion = select_conversion::<S, V, W>(eval);
        tracing::trace!(field = %field, policy = conversion.policy(), "rule declared");
        let body = match conversion {
            Conversion::Exact(source) | Conversion::Wrapped(source) => RuleBody::Ready(
                RuleKernel::with_natural_equality(&field, get, set, source),
            ),
            Conversion::Rejected {
                source_type,
                target_type,
            } => RuleBody::TypeMismatch {
                source_type,
                target_type,
            },
        };

        self.rules.push(PendingRule {
            field,
            writable,
            body,
        });
        self
    }

    /// Declare a rule whose change check goes through a custom equality
    /// strategy instead of `PartialEq`.
    ///
    /// Both sides must produce the same type `V` — the signature unifies
    /// them, so no conversion classification is needed. Rules passing the
    /// *same* strategy instance share one compiled slot; equal-but-distinct
    /// instances do not (identity, not value, is the deduplication key).
    pub fn bind_compared<V, F>(
        mut self,
        target: Accessor<T, V>,
        source: F,
        comparer: Arc<dyn FieldComparer<V>>,
    ) -> Self
    where
        V: Serialize + 'static,
        F: Fn(&S) -> V + Send + Sync + 'static,
    {
        let (field, get, set) = target.into_parts();
        let writable = set.is_some();
        let slot = self.registry.intern(&comparer);
        tracing::trace!(field = %field, slot, "rule declared with custom comparer");

        let source: SourceFn<S, V> = Arc::new(source);
        let kernel = RuleKernel::with_comparer(&field, get, set, source, slot);
        self.rules.push(PendingRule {
            field,
            writable,
            body: RuleBody::Ready(kernel),
        });
        self
    }

    /// Number of rules declared so far.
    pub fn rules_len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rule has been declared.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Validate every pending rule and compile the two operations.
    ///
    /// Consumes the builder: the returned [`Mapper`] is immutable and
    /// reusable, and the builder cannot be built again or mutated afterwards.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] carrying one [`RuleIssue`] per invalid rule
    /// (unwritable member, incompatible types, malformed accessor name),
    /// across the whole rule list. No partial mapper is produced.
    ///
    /// [`RuleIssue`]: crate::RuleIssue
    pub fn build(self) -> Result<Mapper<S, T>, BuildError> {
        let table = self.registry.finalize();
        let rules = validate_rules(self.rules)?;
        tracing::debug!(
            rules = rules.len(),
            comparers = table.len(),
            "field mapper built"
        );
        Ok(Mapper::new(rules, table))
    }
}

impl<S, T> Default for MapperBuilder<S, T>
where
    S: 'static,
    T: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

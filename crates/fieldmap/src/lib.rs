//! # fieldmap — Declarative Field-Mapping Compiler
//!
//! Given two record types, declare once — per target member — where its value
//! comes from and how equality is judged, then build the rule list into an
//! immutable artifact exposing two operations:
//!
//! - **conditional copy** ([`Mapper::map`]): mutates the target to match the
//!   source, but only for members that actually differ, and reports whether
//!   anything changed;
//! - **pure diff** ([`Mapper::diff`]): reports which declared members differ
//!   and their before/after values, mutating nothing.
//!
//! Both operations are compiled from the same per-rule predicates, so they
//! can never disagree about what counts as a change.
//!
//! ## Key Design Principles
//!
//! 1. **Declare freely, validate once.** Declaring a rule never fails; every
//!    problem — unwritable member, incompatible types, malformed accessor —
//!    is collected and reported by a single `build()` call.
//!
//! 2. **No silent narrowing.** A member assignment the engine would have to
//!    narrow (lose precision, truncate) is rejected at build time. The caller
//!    embeds the cast in the source expression, taking responsibility
//!    explicitly; promoting a value into its `Option` wrapper is the one
//!    conversion inserted automatically, because it is always safe.
//!
//! 3. **Build-once by ownership.** `build(self)` consumes the builder. A
//!    second build, or adding rules to a built mapper, is a compile error —
//!    the open/frozen state machine is the move.
//!
//! 4. **Comparers are deduplicated by identity.** Rules sharing one equality
//!    strategy instance compile to one shared slot, wired into the operations
//!    as an explicit ordered input.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Synchronous throughout: no I/O, no suspension points, no locking. A
//!   built [`Mapper`] is `Send + Sync` and reusable across threads against
//!   disjoint target instances.
//!
//! ## Example
//!
//! ```
//! use fieldmap::{field, MapperBuilder};
//!
//! struct Remote {
//!     age: i32,
//!     score: i64,
//! }
//!
//! #[derive(Default)]
//! struct Local {
//!     age: i32,
//!     score: Option<i64>,
//! }
//!
//! let mapper = MapperBuilder::<Remote, Local>::new()
//!     .bind(field!(Local, age), |r: &Remote| r.age)
//!     // i64 into Option<i64>: the Some-wrap is inserted automatically.
//!     .bind(field!(Local, score), |r: &Remote| r.score)
//!     .build()
//!     .expect("rules validate");
//!
//! let remote = Remote { age: 42, score: 5 };
//! let mut local = Local::default();
//!
//! let report = mapper.diff(&remote, &local);
//! assert_eq!(report.len(), 2);
//!
//! assert!(mapper.map(&remote, &mut local));
//! assert_eq!(local.age, 42);
//! assert_eq!(local.score, Some(5));
//!
//! // Already in sync: nothing to copy, nothing to report.
//! assert!(!mapper.map(&remote, &mut local));
//! assert!(mapper.diff(&remote, &local).is_empty());
//! ```

pub mod builder;
pub mod comparer;
pub mod diff;
pub mod error;
pub mod mapper;
pub mod rule;
pub(crate) mod validation;

// ─── Declaration surface re-exports ─────────────────────────────────

pub use builder::MapperBuilder;
pub use rule::Accessor;

// ─── Comparer re-exports ────────────────────────────────────────────

pub use comparer::{comparer_fn, ComparerTable, FieldComparer};

// ─── Artifact and report re-exports ─────────────────────────────────

pub use diff::FieldDiff;
pub use mapper::Mapper;

// ─── Error re-exports ───────────────────────────────────────────────

pub use error::{BuildError, RuleIssue};

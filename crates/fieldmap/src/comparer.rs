//! # Equality Strategies and the Comparer Registry
//!
//! A rule may replace the natural `PartialEq` change check with a custom
//! [`FieldComparer`] — for example, comparing records by a derived key rather
//! than full value equality.
//!
//! ## Identity Deduplication
//!
//! The registry keys strategies by **instance identity** (the `Arc`'s data
//! pointer), never by value equality. Rules sharing one instance share one
//! compiled slot; equal-but-distinct instances get distinct slots. Slot order
//! is first-seen order, so a rule list always wires the same instances to the
//! same slots.
//!
//! The finalized [`ComparerTable`] is handed to the compiled operations as an
//! explicit argument rather than being captured per-rule, which keeps the
//! operations referentially transparent with respect to the comparer set.
//!
//! ## Concurrency Contract
//!
//! Strategies are shared across calls for the lifetime of the mapper, so they
//! must be safe for concurrent read-only invocation (`Send + Sync` bounds on
//! the trait). The engine assumes this rather than enforcing it with locks.

use std::any::Any;
use std::sync::Arc;

/// A custom equality strategy for one member type.
///
/// `equivalent` returning `true` means "no change": the member is neither
/// assigned by `map` nor reported by `diff`.
pub trait FieldComparer<V>: Send + Sync {
    /// Whether the target's current value and the fresh source value are to
    /// be treated as equal.
    fn equivalent(&self, target: &V, source: &V) -> bool;
}

struct FnComparer<F>(F);

impl<V, F> FieldComparer<V> for FnComparer<F>
where
    F: Fn(&V, &V) -> bool + Send + Sync,
{
    fn equivalent(&self, target: &V, source: &V) -> bool {
        (self.0)(target, source)
    }
}

/// Lift a closure into a shareable equality strategy.
///
/// ```
/// use fieldmap::{comparer_fn, FieldComparer};
///
/// let by_len = comparer_fn(|a: &String, b: &String| a.len() == b.len());
/// assert!(by_len.equivalent(&"abc".to_string(), &"xyz".to_string()));
/// ```
pub fn comparer_fn<V, F>(f: F) -> Arc<dyn FieldComparer<V>>
where
    V: 'static,
    F: Fn(&V, &V) -> bool + Send + Sync + 'static,
{
    Arc::new(FnComparer(f))
}

/// One interned strategy instance plus its identity key.
///
/// The key is the `Arc` data pointer address, held only for identity
/// comparison during interning. It is never dereferenced.
struct Slot {
    key: usize,
    comparer: Box<dyn Any + Send + Sync>,
}

/// Build-phase registry deduplicating strategy instances into slots.
#[derive(Default)]
pub(crate) struct ComparerRegistry {
    slots: Vec<Slot>,
}

impl ComparerRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Return the slot for this instance, allocating one on first sight.
    pub(crate) fn intern<V: 'static>(&mut self, comparer: &Arc<dyn FieldComparer<V>>) -> usize {
        let key = Arc::as_ptr(comparer) as *const () as usize;
        if let Some(slot) = self.slots.iter().position(|s| s.key == key) {
            return slot;
        }
        self.slots.push(Slot {
            key,
            comparer: Box::new(Arc::clone(comparer)),
        });
        self.slots.len() - 1
    }

    /// Freeze the registry into the ordered table the compiled operations
    /// receive. Slot indices assigned by `intern` remain valid.
    pub(crate) fn finalize(self) -> ComparerTable {
        ComparerTable {
            entries: self.slots.into_iter().map(|s| s.comparer).collect(),
        }
    }
}

/// The finalized, ordered set of strategy instances owned by a built mapper.
pub struct ComparerTable {
    entries: Vec<Box<dyn Any + Send + Sync>>,
}

impl ComparerTable {
    /// Number of distinct strategy instances across the rule list.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no rule declared a custom strategy.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dispatch an equivalence check through a slot.
    ///
    /// Slots produced by the registry always resolve to a strategy of the
    /// rule's member type; an unresolvable slot reports non-equivalence so
    /// the conditional copy falls back to writing the member.
    pub(crate) fn equivalent<V: 'static>(&self, slot: usize, target: &V, source: &V) -> bool {
        self.entries
            .get(slot)
            .and_then(|entry| entry.downcast_ref::<Arc<dyn FieldComparer<V>>>())
            .map(|comparer| comparer.equivalent(target, source))
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for ComparerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComparerTable")
            .field("len", &self.entries.len())
            .finish()
    }
}

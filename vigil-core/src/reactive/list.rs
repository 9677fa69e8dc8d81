//! Ordered sequences and the Collection Interceptor.
//!
//! A [`List`] is inert until observed. Once observed, its seven mutating
//! operations (`push`, `pop`, `shift`, `unshift`, `sort`, `reverse`,
//! `splice`) apply their effect, observe every element again so inserted
//! containers become reactive, and notify the list's registry exactly once.
//! Reads register the collecting subscriber on that same registry.
//!
//! Assigning to an index with [`List::set_index`] is not intercepted.

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::dep::Dep;
use super::observer::observe;
use super::value::Value;

/// Shared handle to an ordered sequence.
#[derive(Clone)]
pub struct List {
    inner: Arc<ListInner>,
}

struct ListInner {
    id: u64,
    items: RwLock<Vec<Value>>,
    observed: AtomicBool,
    dep: Dep,
}

fn next_list_id() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

impl List {
    pub fn new() -> Self {
        Self::from(Vec::new())
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn ptr_eq(&self, other: &List) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn is_observed(&self) -> bool {
        self.inner.observed.load(Ordering::SeqCst)
    }

    pub(crate) fn container_dep(&self) -> &Dep {
        &self.inner.dep
    }

    /// Mark the list observed and observe every element.
    pub(crate) fn observe(&self) {
        if self.inner.observed.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!(list = self.inner.id, "observing list");
        self.observe_items();
    }

    fn observe_items(&self) {
        let items = self.inner.items.read().clone();
        for item in &items {
            observe(item);
        }
    }

    fn track(&self) {
        if self.is_observed() {
            self.inner.dep.depend();
        }
    }

    /// Finish an intercepted mutation: observe elements, then notify once.
    fn mutated(&self, op: &'static str) {
        if !self.is_observed() {
            return;
        }
        self.observe_items();
        tracing::trace!(list = self.inner.id, op, "list mutated");
        self.inner.dep.notify();
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.track();
        self.inner.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.track();
        self.inner.items.read().get(index).cloned()
    }

    pub fn first(&self) -> Option<Value> {
        self.get(0)
    }

    pub fn last(&self) -> Option<Value> {
        self.track();
        self.inner.items.read().last().cloned()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.index_of(value).is_some()
    }

    /// Position of the first element that is [`same`](Value::same) as `value`.
    pub fn index_of(&self, value: &Value) -> Option<usize> {
        self.track();
        self.inner.items.read().iter().position(|item| item.same(value))
    }

    /// Copy of the elements.
    pub fn to_vec(&self) -> Vec<Value> {
        self.track();
        self.inner.items.read().clone()
    }

    /// Copy of the elements, without tracking.
    pub fn peek_items(&self) -> Vec<Value> {
        self.inner.items.read().clone()
    }

    // ------------------------------------------------------------------
    // Intercepted mutations
    // ------------------------------------------------------------------

    /// Append at the end. Returns the new length.
    pub fn push(&self, value: impl Into<Value>) -> usize {
        let len = {
            let mut items = self.inner.items.write();
            items.push(value.into());
            items.len()
        };
        self.mutated("push");
        len
    }

    /// Remove from the end.
    pub fn pop(&self) -> Option<Value> {
        let popped = self.inner.items.write().pop();
        self.mutated("pop");
        popped
    }

    /// Remove from the front.
    pub fn shift(&self) -> Option<Value> {
        let shifted = {
            let mut items = self.inner.items.write();
            if items.is_empty() {
                None
            } else {
                Some(items.remove(0))
            }
        };
        self.mutated("shift");
        shifted
    }

    /// Insert at the front. Returns the new length.
    pub fn unshift(&self, value: impl Into<Value>) -> usize {
        let len = {
            let mut items = self.inner.items.write();
            items.insert(0, value.into());
            items.len()
        };
        self.mutated("unshift");
        len
    }

    /// Sort in place by the elements' text rendering.
    pub fn sort(&self) {
        self.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
    }

    /// Sort in place with a comparator. The sort is stable.
    ///
    /// The comparator runs on a snapshot with no lock held, so it may read
    /// this list (or a list containing it).
    pub fn sort_by<F>(&self, compare: F)
    where
        F: FnMut(&Value, &Value) -> CmpOrdering,
    {
        let mut sorted = self.inner.items.read().clone();
        sorted.sort_by(compare);
        *self.inner.items.write() = sorted;
        self.mutated("sort");
    }

    /// Reverse in place.
    pub fn reverse(&self) {
        self.inner.items.write().reverse();
        self.mutated("reverse");
    }

    /// Remove `delete_count` elements starting at `start` and insert `insert`
    /// in their place. Out-of-range bounds are clamped. Returns the removed
    /// elements.
    pub fn splice<I>(&self, start: usize, delete_count: usize, insert: I) -> Vec<Value>
    where
        I: IntoIterator<Item = Value>,
    {
        let removed: Vec<Value> = {
            let mut items = self.inner.items.write();
            let start = start.min(items.len());
            let end = start.saturating_add(delete_count).min(items.len());
            let removed = items.splice(start..end, insert).collect();
            removed
        };
        self.mutated("splice");
        removed
    }

    // ------------------------------------------------------------------
    // Untracked writes
    // ------------------------------------------------------------------

    /// Overwrite an existing index. Not intercepted: nobody is notified and
    /// the value is not observed. Returns `false` if `index` is out of range.
    pub fn set_index(&self, index: usize, value: impl Into<Value>) -> bool {
        match self.inner.items.write().get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }
}

impl Default for List {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Value>> for List {
    fn from(items: Vec<Value>) -> Self {
        Self {
            inner: Arc::new(ListInner {
                id: next_list_id(),
                items: RwLock::new(items),
                observed: AtomicBool::new(false),
                dep: Dep::new(),
            }),
        }
    }
}

impl<V: Into<Value>> FromIterator<V> for List {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::from(iter.into_iter().map(Into::into).collect::<Vec<_>>())
    }
}

impl std::fmt::Debug for List {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("List")
            .field("id", &self.inner.id)
            .field("len", &self.inner.items.read().len())
            .field("observed", &self.is_observed())
            .finish()
    }
}

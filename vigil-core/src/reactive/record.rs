//! Keyed records.
//!
//! A [`Record`] starts out plain: its keys are ordinary storage. Observing
//! it swaps every existing key for a [`Property`] interceptor. Keys added
//! afterwards with [`Record::assign`] stay plain; only
//! [`set`](super::observer::set) installs an interceptor for a new key.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::dep::{Dep, DepId};
use super::property::Property;
use super::value::Value;

/// Shared handle to a keyed record.
///
/// Cloning yields another handle to the same record.
#[derive(Clone)]
pub struct Record {
    inner: Arc<RecordInner>,
}

struct RecordInner {
    id: u64,
    slots: RwLock<IndexMap<String, Slot>>,
    /// Instrumentation marker. Lives beside the slots, never among them.
    observed: AtomicBool,
    /// Container registry, notified when any intercepted key changes.
    dep: Dep,
}

#[derive(Clone)]
enum Slot {
    Plain(Value),
    Reactive(Arc<Property>),
}

fn next_record_id() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

impl Record {
    /// Create an empty, plain record.
    pub fn new() -> Self {
        Self::from_slots(IndexMap::new())
    }

    fn from_slots(slots: IndexMap<String, Slot>) -> Self {
        Self {
            inner: Arc::new(RecordInner {
                id: next_record_id(),
                slots: RwLock::new(slots),
                observed: AtomicBool::new(false),
                dep: Dep::new(),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn ptr_eq(&self, other: &Record) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn is_observed(&self) -> bool {
        self.inner.observed.load(Ordering::SeqCst)
    }

    fn slot(&self, key: &str) -> Option<Slot> {
        self.inner.slots.read().get(key).cloned()
    }

    /// Read a key. Intercepted keys register the collecting subscriber.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self.slot(key)? {
            Slot::Plain(value) => Some(value),
            Slot::Reactive(property) => Some(property.get()),
        }
    }

    /// Assign to a key, like `record.key = value`.
    ///
    /// Intercepted keys compare and notify. Any other key, including a brand
    /// new one on an observed record, is stored plainly and notifies nobody.
    pub fn assign(&self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.slot(&key) {
            Some(Slot::Reactive(property)) => {
                property.set(value);
            }
            _ => {
                self.inner.slots.write().insert(key, Slot::Plain(value));
            }
        }
    }

    /// Install a fresh interceptor for `key`, replacing whatever was there.
    pub(crate) fn define(&self, key: String, value: Value) {
        let property = Arc::new(Property::new(key.clone(), value, self.inner.dep.clone()));
        self.inner.slots.write().insert(key, Slot::Reactive(property));
    }

    /// Mark the record observed and intercept every key present now.
    ///
    /// The marker is set before walking, so a record reachable from itself
    /// is walked once.
    pub(crate) fn observe(&self) {
        if self.inner.observed.swap(true, Ordering::SeqCst) {
            return;
        }

        let plain: Vec<(String, Value)> = self
            .inner
            .slots
            .read()
            .iter()
            .filter_map(|(key, slot)| match slot {
                Slot::Plain(value) => Some((key.clone(), value.clone())),
                Slot::Reactive(_) => None,
            })
            .collect();

        tracing::debug!(record = self.inner.id, keys = plain.len(), "observing record");
        for (key, value) in plain {
            self.define(key, value);
        }
    }

    pub(crate) fn container_dep(&self) -> &Dep {
        &self.inner.dep
    }

    /// Whether `key` is currently intercepted.
    pub fn is_reactive(&self, key: &str) -> bool {
        matches!(self.slot(key), Some(Slot::Reactive(_)))
    }

    /// Registry of an intercepted key.
    pub fn dep_id(&self, key: &str) -> Option<DepId> {
        match self.slot(key)? {
            Slot::Reactive(property) => Some(property.dep_id()),
            Slot::Plain(_) => None,
        }
    }

    /// Keys in insertion order. Does not track.
    pub fn keys(&self) -> Vec<String> {
        self.inner.slots.read().keys().cloned().collect()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.slots.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.slots.read().is_empty()
    }

    /// Key/value pairs read without tracking.
    pub fn peek_entries(&self) -> Vec<(String, Value)> {
        self.inner
            .slots
            .read()
            .iter()
            .map(|(key, slot)| {
                let value = match slot {
                    Slot::Plain(value) => value.clone(),
                    Slot::Reactive(property) => property.peek(),
                };
                (key.clone(), value)
            })
            .collect()
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_slots(
            iter.into_iter()
                .map(|(k, v)| (k.into(), Slot::Plain(v.into())))
                .collect(),
        )
    }
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("id", &self.inner.id)
            .field("keys", &self.keys())
            .field("observed", &self.is_observed())
            .finish()
    }
}

//! Dependency Registry
//!
//! A [`Dep`] is the list of subscribers that read one reactive slot. Every
//! intercepted property owns one, and so does every instrumented record or
//! list (its container registry, notified when the container's contents
//! change).
//!
//! Registration is idempotent and non-owning: the registry keeps subscriber
//! IDs and the [`Runtime`] resolves them at notification time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use smallvec::SmallVec;

use super::context::ReactiveContext;
use super::runtime::Runtime;
use super::SubscriberId;

/// Unique identifier for a dependency registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepId(u64);

impl DepId {
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for DepId {
    fn default() -> Self {
        Self::new()
    }
}

/// A set of subscribers to notify when a slot changes.
///
/// Cloning a `Dep` yields another handle to the same registry.
#[derive(Clone)]
pub struct Dep {
    inner: Arc<DepInner>,
}

struct DepInner {
    id: DepId,
    /// Registered subscribers in registration order.
    subscribers: RwLock<SmallVec<[SubscriberId; 4]>>,
}

impl Dep {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DepInner {
                id: DepId::new(),
                subscribers: RwLock::new(SmallVec::new()),
            }),
        }
    }

    pub fn id(&self) -> DepId {
        self.inner.id
    }

    /// Register the current subscriber, if one is collecting.
    ///
    /// Reading the same slot twice in one tracked read registers once.
    pub fn depend(&self) {
        if let Some(subscriber_id) = ReactiveContext::current_subscriber() {
            if ReactiveContext::track_dependency(self.inner.id) {
                self.add_subscriber(subscriber_id);
            }
        }
    }

    /// Add a subscriber directly. Adding an already registered ID is a no-op.
    pub fn add_subscriber(&self, subscriber_id: SubscriberId) {
        let mut subscribers = self.inner.subscribers.write();
        if !subscribers.contains(&subscriber_id) {
            subscribers.push(subscriber_id);
        }
    }

    /// Register every live subscriber of `source` here as well, keeping
    /// `source`'s order after the subscribers already present.
    pub fn adopt(&self, source: &Dep) {
        if Arc::ptr_eq(&self.inner, &source.inner) {
            return;
        }
        let adopted: SmallVec<[SubscriberId; 4]> = source
            .inner
            .subscribers
            .read()
            .iter()
            .copied()
            .filter(|id| Runtime::is_registered(*id))
            .collect();
        for id in adopted {
            self.add_subscriber(id);
        }
    }

    /// Number of registered subscribers that are still alive.
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .read()
            .iter()
            .filter(|id| Runtime::is_registered(**id))
            .count()
    }

    /// Notify every live subscriber, in registration order.
    ///
    /// Returns the number of subscribers updated.
    pub fn notify(&self) -> usize {
        Self::notify_all(&[self])
    }

    /// Notify the union of several registries, updating each subscriber once.
    ///
    /// Subscribers are ordered by their first appearance, walking `deps` in
    /// the given order.
    pub fn notify_all(deps: &[&Dep]) -> usize {
        let mut ids: SmallVec<[SubscriberId; 8]> = SmallVec::new();
        for dep in deps {
            let mut subscribers = dep.inner.subscribers.write();
            subscribers.retain(|id| Runtime::is_registered(*id));
            for id in subscribers.iter() {
                if !ids.contains(id) {
                    ids.push(*id);
                }
            }
        }

        tracing::trace!(subscribers = ids.len(), "notifying dependents");
        Runtime::notify_subscribers(&ids)
    }
}

impl Default for Dep {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dep")
            .field("id", &self.inner.id)
            .field("subscribers", &self.inner.subscribers.read().len())
            .finish()
    }
}

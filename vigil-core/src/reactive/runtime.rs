//! Reactive Runtime
//!
//! The runtime is the registry that turns subscriber IDs back into live
//! subscribers. Dependency registries only store IDs; when a property
//! changes, the runtime resolves those IDs and calls `update()` on each
//! subscriber that is still alive.
//!
//! # How It Works
//!
//! 1. When a watcher is created, it registers itself with the runtime and
//!    keeps the returned [`SubscriberHandle`].
//!
//! 2. When the watcher is dropped, the handle unregisters it. Registries
//!    that still mention its ID skip it from then on.
//!
//! 3. When a registry notifies, the runtime upgrades each weak reference,
//!    releases its own map, and only then runs the updates. Updates may
//!    read (and even write) reactive values without deadlocking.

use std::sync::{Arc, OnceLock, Weak};

use dashmap::DashMap;

use super::subscriber::{Subscriber, SubscriberId};

/// Handle to a registered subscriber.
///
/// Dropping this handle unregisters the subscriber from the runtime.
#[derive(Debug)]
pub struct SubscriberHandle {
    subscriber_id: SubscriberId,
}

impl SubscriberHandle {
    /// Get the ID this handle keeps registered.
    pub fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }
}

impl Drop for SubscriberHandle {
    fn drop(&mut self) {
        Runtime::unregister(self.subscriber_id);
    }
}

/// The global reactive runtime.
pub struct Runtime;

// Maps subscriber IDs to weak references so the runtime never owns a
// subscriber.
static REGISTRY: OnceLock<DashMap<SubscriberId, Weak<dyn Subscriber>>> = OnceLock::new();

fn get_registry() -> &'static DashMap<SubscriberId, Weak<dyn Subscriber>> {
    REGISTRY.get_or_init(DashMap::new)
}

impl Runtime {
    /// Register a subscriber with the runtime.
    ///
    /// Returns a handle that unregisters the subscriber when dropped.
    pub fn register(subscriber: Arc<dyn Subscriber>) -> SubscriberHandle {
        let id = subscriber.subscriber_id();
        get_registry().insert(id, Arc::downgrade(&subscriber));
        SubscriberHandle { subscriber_id: id }
    }

    fn unregister(id: SubscriberId) {
        get_registry().remove(&id);
    }

    /// Check whether a subscriber is still registered and alive.
    pub fn is_registered(id: SubscriberId) -> bool {
        get_registry()
            .get(&id)
            .map(|weak| weak.strong_count() > 0)
            .unwrap_or(false)
    }

    /// Run `update()` on every live subscriber in `ids`, in order.
    ///
    /// Returns the number of subscribers that were updated.
    pub fn notify_subscribers(ids: &[SubscriberId]) -> usize {
        if ids.is_empty() {
            return 0;
        }

        // Resolve first; the map guard must not be held while updates run.
        let live: Vec<Arc<dyn Subscriber>> = {
            let registry = get_registry();
            ids.iter()
                .filter_map(|id| registry.get(id).and_then(|weak| weak.upgrade()))
                .collect()
        };

        for subscriber in &live {
            subscriber.update();
        }

        live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};

    struct MockSubscriber {
        id: SubscriberId,
        updates: AtomicI32,
    }

    impl MockSubscriber {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                id: SubscriberId::new(),
                updates: AtomicI32::new(0),
            })
        }
    }

    impl Subscriber for MockSubscriber {
        fn subscriber_id(&self) -> SubscriberId {
            self.id
        }

        fn update(&self) {
            self.updates.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn runtime_registers_and_unregisters() {
        let subscriber = MockSubscriber::new();
        let id = subscriber.id;

        let handle = Runtime::register(subscriber.clone());
        assert!(Runtime::is_registered(id));

        drop(handle);
        assert!(!Runtime::is_registered(id));
    }

    #[test]
    fn runtime_notifies_live_subscribers_in_order() {
        let first = MockSubscriber::new();
        let second = MockSubscriber::new();

        let _h1 = Runtime::register(first.clone());
        let _h2 = Runtime::register(second.clone());

        let updated = Runtime::notify_subscribers(&[first.id, second.id]);
        assert_eq!(updated, 2);
        assert_eq!(first.updates.load(Ordering::SeqCst), 1);
        assert_eq!(second.updates.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn runtime_skips_dropped_subscribers() {
        let kept = MockSubscriber::new();
        let _kept_handle = Runtime::register(kept.clone());

        let dropped_id = {
            let gone = MockSubscriber::new();
            let id = gone.id;
            let _handle = Runtime::register(gone);
            id
        };

        let updated = Runtime::notify_subscribers(&[dropped_id, kept.id]);
        assert_eq!(updated, 1);
        assert_eq!(kept.updates.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn registry_does_not_own_subscribers() {
        let subscriber = MockSubscriber::new();
        let id = subscriber.id;
        let _handle = Runtime::register(subscriber.clone());

        drop(subscriber);
        assert!(!Runtime::is_registered(id));
        assert_eq!(Runtime::notify_subscribers(&[id]), 0);
    }
}

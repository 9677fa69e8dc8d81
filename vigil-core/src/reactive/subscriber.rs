//! Subscriber types for the reactive system.
//!
//! A Subscriber represents any computation that must be re-run when a value
//! it read earlier changes. Watchers are the only subscribers the runtime
//! ships, but dependency registries only ever see this trait.

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a subscriber.
///
/// Dependency registries store these IDs rather than the subscriber itself,
/// so a registry never keeps a subscriber alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    ///
    /// Uses an atomic counter to ensure uniqueness across threads.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// A computation that can be notified when one of its dependencies changes.
pub trait Subscriber: Send + Sync {
    /// Get the subscriber ID used for dependency tracking.
    fn subscriber_id(&self) -> SubscriberId;

    /// Re-read the tracked value and hand it to the change callback.
    fn update(&self);
}

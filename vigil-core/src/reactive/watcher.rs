//! Watcher Implementation
//!
//! A Watcher binds one accessor (usually a property path on a target value)
//! to a change callback.
//!
//! # How Watchers Work
//!
//! 1. On creation, the watcher registers with the [`Runtime`] and runs its
//!    accessor once inside a tracking frame. Every intercepted read during
//!    that run adds the watcher to the corresponding registry.
//!
//! 2. When one of those registries notifies, `update()` re-reads the accessor
//!    and passes the fresh value to the callback.
//!
//! 3. Dropping the watcher unregisters it; registries skip it from then on.
//!
//! # Limitations
//!
//! Dependencies are collected once, at creation. `update()` re-reads without
//! tracking, so an accessor whose reads depend on a branch keeps the
//! dependency set of its first run.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Result, VigilError};

use super::context::ReactiveContext;
use super::dep::DepId;
use super::runtime::{Runtime, SubscriberHandle};
use super::subscriber::{Subscriber, SubscriberId};
use super::value::Value;

type Accessor = Box<dyn Fn() -> Value + Send + Sync>;
type Callback = Box<dyn Fn(&Value) + Send + Sync>;

/// A reactive binding from an accessor to a change callback.
///
/// The watcher's owner keeps it alive; registries only know its ID.
///
/// # Example
///
/// ```rust,ignore
/// let state = reactive(Value::from_json(json!({"count": 0})));
///
/// let watcher = Watcher::new(&state, "count", |v| println!("count = {v}"))?;
///
/// state.as_record().unwrap().assign("count", 1); // prints "count = 1"
/// ```
pub struct Watcher {
    inner: Arc<WatcherInner>,
    _handle: SubscriberHandle,
}

struct WatcherInner {
    subscriber_id: SubscriberId,
    accessor: Accessor,
    callback: Callback,
    /// Registries joined during the initial run.
    dependencies: RwLock<Vec<DepId>>,
    update_count: AtomicUsize,
}

impl Watcher {
    /// Watch a dot-separated property path on `target`.
    ///
    /// An empty path watches the target container itself. Numeric segments
    /// index into lists. A missing segment reads as `Null`.
    pub fn new<F>(target: &Value, path: &str, on_change: F) -> Result<Self>
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let segments = parse_path(path)?;
        let target = target.clone();
        Ok(Self::with_accessor(
            move || resolve(&target, &segments),
            on_change,
        ))
    }

    /// Watch an arbitrary accessor.
    pub fn with_accessor<A, F>(accessor: A, on_change: F) -> Self
    where
        A: Fn() -> Value + Send + Sync + 'static,
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let inner = Arc::new(WatcherInner {
            subscriber_id: SubscriberId::new(),
            accessor: Box::new(accessor),
            callback: Box::new(on_change),
            dependencies: RwLock::new(Vec::new()),
            update_count: AtomicUsize::new(0),
        });

        let handle = Runtime::register(inner.clone());
        inner.collect();

        tracing::trace!(
            subscriber = inner.subscriber_id.raw(),
            dependencies = inner.dependencies.read().len(),
            "watcher created"
        );

        Self {
            inner,
            _handle: handle,
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.inner.subscriber_id
    }

    /// Re-read and invoke the callback, as a registry would.
    pub fn update(&self) {
        self.inner.update();
    }

    /// Current value of the accessor, read without tracking.
    pub fn value(&self) -> Value {
        self.inner.read()
    }

    /// Registries this watcher joined when it was created.
    pub fn dependencies(&self) -> Vec<DepId> {
        self.inner.dependencies.read().clone()
    }

    pub fn dependency_count(&self) -> usize {
        self.inner.dependencies.read().len()
    }

    /// Number of times the callback has run.
    pub fn update_count(&self) -> usize {
        self.inner.update_count.load(Ordering::SeqCst)
    }
}

impl WatcherInner {
    fn collect(&self) {
        let dependencies = {
            let _ctx = ReactiveContext::enter(self.subscriber_id);
            (self.accessor)();
            ReactiveContext::get_dependencies()
        };
        *self.dependencies.write() = dependencies;
    }

    fn read(&self) -> Value {
        let _quiet = ReactiveContext::untracked();
        (self.accessor)()
    }
}

impl Subscriber for WatcherInner {
    fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }

    fn update(&self) {
        let _quiet = ReactiveContext::untracked();
        let value = (self.accessor)();
        self.update_count.fetch_add(1, Ordering::SeqCst);
        (self.callback)(&value);
    }
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("id", &self.inner.subscriber_id)
            .field("dependency_count", &self.dependency_count())
            .field("update_count", &self.update_count())
            .finish()
    }
}

fn parse_path(path: &str) -> Result<Vec<String>> {
    let path = path.trim();
    if path.is_empty() {
        return Ok(Vec::new());
    }

    path.split('.')
        .map(|segment| {
            let segment = segment.trim();
            if segment.is_empty() {
                Err(VigilError::InvalidPath(path.to_string()))
            } else {
                Ok(segment.to_string())
            }
        })
        .collect()
}

fn resolve(target: &Value, segments: &[String]) -> Value {
    if segments.is_empty() {
        target.track();
        return target.clone();
    }

    let mut current = target.clone();
    for segment in segments {
        match current.get(segment) {
            Some(next) => current = next,
            None => return Value::Null,
        }
    }
    current
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

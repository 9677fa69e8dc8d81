//! Reactive Context
//!
//! The reactive context tracks which subscriber is currently collecting
//! dependencies. When an intercepted property is read, it asks the context
//! "who is asking?" and registers that subscriber with its dependency
//! registry.
//!
//! # Implementation
//!
//! We use a thread-local stack of frames. Constructing a watcher pushes a
//! tracking frame, performs the tracked read, and pops it. Re-reading a
//! value during `update()` pushes an *untracked* frame so that nothing is
//! collected into whichever watcher happens to be under construction
//! further down the stack.
//!
//! Because frames nest, building a watcher from inside another watcher's
//! tracked read is well-defined: the inner watcher collects its own
//! dependencies, then the outer one resumes.

use std::cell::RefCell;

use smallvec::SmallVec;

use super::dep::DepId;
use super::SubscriberId;

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<ContextEntry>> = const { RefCell::new(Vec::new()) };
}

/// An entry in the reactive context stack.
#[derive(Debug, Clone)]
struct ContextEntry {
    /// The subscriber collecting dependencies, `None` for an untracked frame.
    subscriber_id: Option<SubscriberId>,
    /// Registries the subscriber was added to during this frame, deduplicated.
    dependencies: SmallVec<[DepId; 4]>,
}

/// Guard that pops its frame when dropped.
///
/// This keeps the stack balanced even if the tracked read panics.
pub struct ReactiveContext {
    subscriber_id: Option<SubscriberId>,
    depth: usize,
}

impl ReactiveContext {
    /// Enter a tracking frame for the given subscriber.
    ///
    /// While this guard is alive, intercepted reads register `subscriber_id`
    /// with the registries they own.
    pub fn enter(subscriber_id: SubscriberId) -> Self {
        Self::push(Some(subscriber_id))
    }

    /// Enter a frame that suppresses dependency collection.
    pub fn untracked() -> Self {
        Self::push(None)
    }

    fn push(subscriber_id: Option<SubscriberId>) -> Self {
        let depth = CONTEXT_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.push(ContextEntry {
                subscriber_id,
                dependencies: SmallVec::new(),
            });
            stack.len()
        });

        Self {
            subscriber_id,
            depth,
        }
    }

    /// Check if a subscriber is currently collecting dependencies.
    pub fn is_active() -> bool {
        Self::current_subscriber().is_some()
    }

    /// Get the current subscriber ID, if any.
    pub fn current_subscriber() -> Option<SubscriberId> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().and_then(|entry| entry.subscriber_id))
    }

    /// Record that the current subscriber was registered with `dep_id`.
    ///
    /// Returns `false` if the registry was already recorded in this frame, or
    /// if no subscriber is collecting.
    pub fn track_dependency(dep_id: DepId) -> bool {
        CONTEXT_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            match stack.last_mut() {
                Some(entry) if entry.subscriber_id.is_some() => {
                    if entry.dependencies.contains(&dep_id) {
                        false
                    } else {
                        entry.dependencies.push(dep_id);
                        true
                    }
                }
                _ => false,
            }
        })
    }

    /// Get the registries collected in the current frame.
    pub fn get_dependencies() -> Vec<DepId> {
        CONTEXT_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .map(|entry| entry.dependencies.to_vec())
                .unwrap_or_default()
        })
    }
}

impl Drop for ReactiveContext {
    fn drop(&mut self) {
        let popped = CONTEXT_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            let len = stack.len();
            (len, stack.pop())
        });

        if std::thread::panicking() {
            return;
        }

        // A frame must be popped by the guard that pushed it.
        let (len, entry) = popped;
        assert_eq!(
            len, self.depth,
            "reactive context stack corrupted: guard for {:?} expected depth {}, found {}",
            self.subscriber_id, self.depth, len
        );
        if let Some(entry) = entry {
            assert_eq!(
                entry.subscriber_id, self.subscriber_id,
                "reactive context mismatch: expected {:?}, got {:?}",
                self.subscriber_id, entry.subscriber_id
            );
        }
    }
}

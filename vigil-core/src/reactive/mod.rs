//! Reactive Data
//!
//! This module implements transparent reactivity over plain data: records,
//! lists and scalars. Observing a value installs interception on it; watchers
//! created afterwards discover, just by reading, which parts of the value
//! they depend on.
//!
//! # Concepts
//!
//! ## Observation
//!
//! [`observe`] walks a [`Value`]. Every key of every reachable [`Record`]
//! becomes a property interceptor; every reachable [`List`] gets its
//! mutating operations intercepted. Observation is idempotent.
//!
//! ## Dependency Registries
//!
//! Each intercepted key owns a [`Dep`], the set of subscribers that read it.
//! Each observed record or list also owns one for the container as a whole.
//!
//! ## Watchers
//!
//! A [`Watcher`] runs its accessor once inside a tracking frame, joining the
//! registry of every key it reads. When one of those keys is written with a
//! different value, the registry calls the watcher back with a fresh read.
//!
//! # Implementation Notes
//!
//! The "who is reading?" question is answered by a thread-local stack of
//! tracking frames ([`ReactiveContext`]). Everything is synchronous: a write
//! returns only after every affected watcher has run.
//!
//! Records do not pick up keys added by plain assignment after observation;
//! use [`set`] for that. Lists, by contrast, track their seven mutating
//! operations. Index assignment on a list is not tracked.

mod context;
mod dep;
mod list;
mod observer;
mod property;
mod record;
mod runtime;
mod subscriber;
mod value;
mod watcher;

pub use context::ReactiveContext;
pub use dep::{Dep, DepId};
pub use list::List;
pub use observer::{observe, reactive, set};
pub use record::Record;
pub use runtime::{Runtime, SubscriberHandle};
pub use subscriber::{Subscriber, SubscriberId};
pub use value::Value;
pub use watcher::Watcher;

//! Property Interceptor
//!
//! A [`Property`] replaces direct storage of one record key. Reads register
//! the collecting subscriber; writes that actually change the value observe
//! the new value and notify.
//!
//! The captured value is private to the property. The owning record only
//! holds the property behind an `Arc`, so there is no path to the value that
//! skips the interceptor.

use parking_lot::RwLock;

use super::dep::{Dep, DepId};
use super::observer::observe;
use super::value::Value;

pub(crate) struct Property {
    key: String,
    value: RwLock<Value>,
    /// Subscribers that read this key.
    dep: Dep,
    /// Container registry of the record that owns this key.
    owner: Dep,
}

impl Property {
    /// Install an interceptor holding `value`, observing it first.
    pub(crate) fn new(key: String, value: Value, owner: Dep) -> Self {
        observe(&value);
        Self {
            key,
            value: RwLock::new(value),
            dep: Dep::new(),
            owner,
        }
    }

    pub(crate) fn dep_id(&self) -> DepId {
        self.dep.id()
    }

    /// Intercepted read.
    ///
    /// Registers the collecting subscriber on this key and, when the value is
    /// itself a container, on the container's registry too.
    pub(crate) fn get(&self) -> Value {
        self.dep.depend();
        let value = self.value.read().clone();
        value.track();
        value
    }

    /// Read without registering anything.
    pub(crate) fn peek(&self) -> Value {
        self.value.read().clone()
    }

    /// Intercepted write. Returns `true` if subscribers were notified.
    pub(crate) fn set(&self, new_value: Value) -> bool {
        if self.value.read().same(&new_value) {
            return false;
        }

        observe(&new_value);
        // Readers of this key keep following the container now stored here.
        if let Some(container) = new_value.container_dep() {
            container.adopt(&self.dep);
        }
        *self.value.write() = new_value;

        let notified = Dep::notify_all(&[&self.dep, &self.owner]);
        tracing::trace!(key = %self.key, notified, "property changed");
        true
    }
}

impl std::fmt::Debug for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("key", &self.key)
            .field("dep", &self.dep)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::list::List;

    #[test]
    fn same_value_write_is_ignored() {
        let property = Property::new("count".into(), Value::from(0), Dep::new());
        assert!(!property.set(Value::from(0)));
        assert!(property.set(Value::from(1)));
        assert_eq!(property.peek(), Value::from(1));
    }

    #[test]
    fn initial_and_written_containers_are_observed() {
        let initial = Value::List(List::from(vec![Value::from(1)]));
        let property = Property::new("items".into(), initial.clone(), Dep::new());
        assert!(initial.is_observed());

        let replacement = Value::List(List::new());
        assert!(!replacement.is_observed());
        property.set(replacement.clone());
        assert!(replacement.is_observed());
    }

    #[test]
    fn reading_without_subscriber_has_no_side_effect() {
        let property = Property::new("name".into(), Value::from("vigil"), Dep::new());
        assert_eq!(property.get(), Value::from("vigil"));
        assert_eq!(property.dep.subscriber_count(), 0);
    }
}

//! Deep Instrumentor
//!
//! [`observe`] walks a value and installs interception everywhere it can
//! reach: every key of every record becomes a property interceptor, every
//! list gets its mutating operations intercepted. Scalars are left alone.
//!
//! Observation is idempotent. Each container carries its own marker, set
//! before its contents are walked, so observing twice (or observing a graph
//! with a cycle) never wraps a key twice.

use super::record::Record;
use super::value::Value;

/// Make `value` and everything reachable from it reactive.
pub fn observe(value: &Value) {
    match value {
        Value::Record(record) => record.observe(),
        Value::List(list) => list.observe(),
        _ => {}
    }
}

/// Observe `value` and hand it back. Convenience for building state inline.
pub fn reactive(value: impl Into<Value>) -> Value {
    let value = value.into();
    observe(&value);
    value
}

/// Add `key` to `record` as a reactive property holding `value`.
///
/// This is the only way to make a key reactive after the record was
/// observed. Installing does not notify anyone; later writes to the key do.
/// An existing key is replaced by a fresh interceptor, which starts with no
/// subscribers.
pub fn set(record: &Record, key: impl Into<String>, value: impl Into<Value>) {
    let key = key.into();
    tracing::trace!(record = record.id(), key = %key, "defining reactive key");
    record.define(key, value.into());
}

//! Dynamic values.
//!
//! [`Value`] is the plain data the runtime instruments: scalars plus two
//! shared containers, [`Record`] and [`List`]. Containers are handles, so
//! cloning a `Value::Record` clones the handle, not the contents. Equality
//! follows the same rule the property interceptor uses on write: scalars
//! compare by value, containers by identity.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::dep::Dep;
use super::list::List;
use super::record::Record;

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Record(Record),
    List(List),
}

impl Value {
    /// Identity-or-value comparison used to decide whether a write changes
    /// anything.
    ///
    /// Two distinct records with identical contents are *not* the same.
    /// `NaN` is never the same as itself.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a.ptr_eq(b),
            (Value::List(a), Value::List(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Records and lists are containers; everything else is a scalar.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Record(_) | Value::List(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Whether this value has been through the observer. Scalars never are.
    pub fn is_observed(&self) -> bool {
        match self {
            Value::Record(r) => r.is_observed(),
            Value::List(l) => l.is_observed(),
            _ => false,
        }
    }

    /// Look up one path segment: a key for records, an index for lists.
    ///
    /// Reads go through interception, so this tracks when a subscriber is
    /// collecting.
    pub fn get(&self, segment: &str) -> Option<Value> {
        match self {
            Value::Record(r) => r.get(segment),
            Value::List(l) => segment.parse::<usize>().ok().and_then(|i| l.get(i)),
            _ => None,
        }
    }

    /// Register the collecting subscriber on this container's own registry.
    pub(crate) fn track(&self) {
        if let Some(dep) = self.container_dep() {
            dep.depend();
        }
    }

    /// The container registry, present only once the container is observed.
    pub(crate) fn container_dep(&self) -> Option<&Dep> {
        match self {
            Value::Record(r) if r.is_observed() => Some(r.container_dep()),
            Value::List(l) if l.is_observed() => Some(l.container_dep()),
            _ => None,
        }
    }

    /// Build a plain (not yet observed) value from JSON.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Record(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Snapshot this value as JSON without registering any dependency.
    ///
    /// A container that appears inside itself renders as `null` at the
    /// point where it repeats. Shared containers that are not cyclic render
    /// in full at every occurrence.
    pub fn to_json(&self) -> serde_json::Value {
        self.to_json_within(&mut Vec::new())
    }

    fn to_json_within(&self, ancestors: &mut Vec<ContainerKey>) -> serde_json::Value {
        let key = match self {
            Value::Null => return serde_json::Value::Null,
            Value::Bool(b) => return serde_json::Value::Bool(*b),
            Value::Number(n) => return number_to_json(*n),
            Value::String(s) => return serde_json::Value::String(s.clone()),
            Value::Record(r) => ContainerKey::Record(r.id()),
            Value::List(l) => ContainerKey::List(l.id()),
        };
        if ancestors.contains(&key) {
            return serde_json::Value::Null;
        }

        ancestors.push(key);
        let json = match self {
            Value::Record(r) => serde_json::Value::Object(
                r.peek_entries()
                    .into_iter()
                    .map(|(k, v)| (k, v.to_json_within(ancestors)))
                    .collect(),
            ),
            Value::List(l) => serde_json::Value::Array(
                l.peek_items()
                    .iter()
                    .map(|v| v.to_json_within(ancestors))
                    .collect(),
            ),
            _ => serde_json::Value::Null,
        };
        ancestors.pop();
        json
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ContainerKey {
    Record(u64),
    List(u64),
}

fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Record(r) => fmt::Debug::fmt(r, f),
            Value::List(l) => fmt::Debug::fmt(l, f),
        }
    }
}

/// Text rendering used by template bindings. `Null` renders as empty.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Record(_) | Value::List(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from_json)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

impl From<List> for Value {
    fn from(l: List) -> Self {
        Value::List(l)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from_json(json)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

//! View Model
//!
//! A [`ViewModel`] owns the observed data record of one mounted template and
//! proxies its top-level keys: `vm.get("title")` reads `data.title` through
//! the property interceptor, `vm.assign("title", ..)` writes through it.
//!
//! The proxied key set is fixed when the view model is built. A key added to
//! the data later (even through [`set`](crate::reactive::set)) is reachable
//! via [`ViewModel::data`] but not through the proxy.

use crate::error::{Result, VigilError};
use crate::reactive::{observe, Record, Value, Watcher};
use crate::template::{Bindings, Compiler, CompilerOptions, HostNode};

pub struct ViewModel {
    data: Record,
    proxied: Vec<String>,
}

impl ViewModel {
    /// Observe `data` and proxy its current keys.
    pub fn new(data: impl Into<Value>) -> Result<Self> {
        let data = match data.into() {
            Value::Record(record) => record,
            _ => return Err(VigilError::NotARecord),
        };
        observe(&Value::Record(data.clone()));

        let proxied = data.keys();
        tracing::debug!(keys = proxied.len(), "view model created");
        Ok(Self { data, proxied })
    }

    /// Build a view model from a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        let json: serde_json::Value = serde_json::from_str(json)?;
        Self::new(Value::from_json(json))
    }

    /// The observed data record.
    pub fn data(&self) -> &Record {
        &self.data
    }

    pub fn is_proxied(&self, key: &str) -> bool {
        self.proxied.iter().any(|k| k == key)
    }

    /// Read a proxied key. Tracks like a direct read of the data.
    pub fn get(&self, key: &str) -> Option<Value> {
        if self.is_proxied(key) {
            self.data.get(key)
        } else {
            None
        }
    }

    /// Write a proxied key. Returns `false` if `key` is not proxied.
    pub fn assign(&self, key: &str, value: impl Into<Value>) -> bool {
        if !self.is_proxied(key) {
            return false;
        }
        self.data.assign(key, value);
        true
    }

    /// Watch a property path on the data.
    pub fn watch<F>(&self, path: &str, on_change: F) -> Result<Watcher>
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        Watcher::new(&Value::Record(self.data.clone()), path, on_change)
    }

    /// Compile the children of `root` against this view model with default
    /// options. Keep the returned bindings alive for as long as the nodes
    /// should stay in sync.
    pub fn mount<N: HostNode>(&self, root: &N) -> Result<Bindings> {
        Compiler::new(self).compile(root)
    }

    pub fn mount_with<N: HostNode>(&self, root: &N, options: CompilerOptions) -> Result<Bindings> {
        Compiler::with_options(self, options)?.compile(root)
    }
}

impl std::fmt::Debug for ViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewModel")
            .field("data", &self.data)
            .field("proxied", &self.proxied)
            .finish()
    }
}

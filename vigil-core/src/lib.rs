//! Vigil Core
//!
//! This crate provides a small reactive data runtime. It implements:
//!
//! - Deep observation of plain data (records, lists, scalars)
//! - Automatic dependency tracking through intercepted reads
//! - Synchronous change notification to watchers
//! - A minimal template binder built on top of the runtime
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: Observation, dependency registries, and watchers
//! - `template`: Host node abstraction and the binding compiler
//! - `vm`: The view model that owns a template's data
//!
//! # Example
//!
//! ```rust,ignore
//! use vigil_core::reactive::{reactive, Value, Watcher};
//! use serde_json::json;
//!
//! // Observe some state
//! let state = reactive(Value::from_json(json!({"count": 0})));
//!
//! // Watch one property
//! let watcher = Watcher::new(&state, "count", |v| println!("Count: {v}"))?;
//!
//! // Write through the interceptor
//! state.as_record().unwrap().assign("count", 5);
//! // Watcher runs, prints: "Count: 5"
//! ```

pub mod reactive;
pub mod template;
pub mod vm;

mod error;

pub use error::{Result, VigilError};
pub use vm::ViewModel;

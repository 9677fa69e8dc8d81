//! Template Binding
//!
//! A deliberately small consumer of the reactive runtime. It scans a host
//! node tree for two kinds of bindings, `{{ path }}` interpolations in text
//! nodes and `k-text` / `k-html` directives on elements, and keeps each bound
//! node in sync with the view model through a [`Watcher`](crate::reactive::Watcher).
//!
//! The host document is abstracted behind [`HostNode`]; [`DomNode`] is an
//! in-memory implementation.

mod compiler;
mod node;
mod options;

pub use compiler::{Bindings, Compiler, Directive};
pub use node::{DomNode, HostNode, NodeKind};
pub use options::CompilerOptions;

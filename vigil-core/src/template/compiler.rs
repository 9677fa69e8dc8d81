//! Template Compiler
//!
//! Walks a host node tree once and turns every binding it finds into a
//! [`Watcher`] on the view model's data:
//!
//! - An element attribute `k-text="path"` sets the element's text.
//! - An element attribute `k-html="path"` sets the element's markup.
//! - A text node containing `{{ path }}` is replaced by the value.
//!
//! Each binding writes its initial value immediately and rewrites the node
//! whenever the watched path changes. The prefix and delimiters come from
//! [`CompilerOptions`].

use crate::error::{Result, VigilError};
use crate::reactive::{Value, Watcher};
use crate::vm::ViewModel;

use super::node::{HostNode, NodeKind};
use super::options::CompilerOptions;

/// What a binding writes into its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Text,
    Html,
}

impl Directive {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "text" => Some(Directive::Text),
            "html" => Some(Directive::Html),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Directive::Text => "text",
            Directive::Html => "html",
        }
    }

    fn apply<N: HostNode>(&self, node: &N, value: &Value) {
        let rendered = value.to_string();
        match self {
            Directive::Text => node.set_text_content(&rendered),
            Directive::Html => node.set_inner_html(&rendered),
        }
    }
}

/// Watchers created by one compile pass.
///
/// Dropping this stops every binding.
#[derive(Debug, Default)]
pub struct Bindings {
    watchers: Vec<Watcher>,
}

impl Bindings {
    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }

    pub fn watchers(&self) -> &[Watcher] {
        &self.watchers
    }
}

pub struct Compiler<'vm> {
    vm: &'vm ViewModel,
    options: CompilerOptions,
}

impl<'vm> Compiler<'vm> {
    pub fn new(vm: &'vm ViewModel) -> Self {
        Self {
            vm,
            options: CompilerOptions::default(),
        }
    }

    pub fn with_options(vm: &'vm ViewModel, options: CompilerOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { vm, options })
    }

    /// Compile every descendant of `root` (but not `root` itself).
    pub fn compile<N: HostNode>(&self, root: &N) -> Result<Bindings> {
        let mut bindings = Bindings::default();
        self.compile_children(root, &mut bindings)?;
        tracing::debug!(bindings = bindings.len(), "template compiled");
        Ok(bindings)
    }

    fn compile_children<N: HostNode>(&self, parent: &N, bindings: &mut Bindings) -> Result<()> {
        for node in parent.child_nodes() {
            let owns_content = match node.kind() {
                NodeKind::Element => self.compile_element(&node, bindings)?,
                NodeKind::Text => {
                    if let Some(expression) = self.interpolation(&node.text_content())? {
                        self.bind(&node, &expression, Directive::Text, bindings)?;
                    }
                    true
                }
            };

            // A bound element's children are produced by its binding.
            if !owns_content {
                self.compile_children(&node, bindings)?;
            }
        }
        Ok(())
    }

    /// Bind the element's directives. Returns `true` if one of them now owns
    /// the element's content.
    fn compile_element<N: HostNode>(&self, node: &N, bindings: &mut Bindings) -> Result<bool> {
        let mut owns_content = false;
        for (name, expression) in node.attributes() {
            let Some(directive_name) = name.strip_prefix(self.options.directive_prefix.as_str())
            else {
                continue;
            };
            let directive = Directive::parse(directive_name)
                .ok_or_else(|| VigilError::UnknownDirective(name.clone()))?;
            self.bind(node, &expression, directive, bindings)?;
            owns_content = true;
        }
        Ok(owns_content)
    }

    /// Extract the expression between the outermost delimiters, if any.
    fn interpolation(&self, text: &str) -> Result<Option<String>> {
        let open = self.options.open_delimiter.as_str();
        let close = self.options.close_delimiter.as_str();

        let Some(start) = text.find(open) else {
            return Ok(None);
        };
        let rest = &text[start + open.len()..];
        let Some(end) = rest.rfind(close) else {
            return Err(VigilError::MalformedInterpolation(text.to_string()));
        };

        let expression = rest[..end].trim();
        if expression.is_empty() {
            return Err(VigilError::MalformedInterpolation(text.to_string()));
        }
        Ok(Some(expression.to_string()))
    }

    fn bind<N: HostNode>(
        &self,
        node: &N,
        expression: &str,
        directive: Directive,
        bindings: &mut Bindings,
    ) -> Result<()> {
        let target = node.clone();
        let watcher = self
            .vm
            .watch(expression, move |value| directive.apply(&target, value))?;

        directive.apply(node, &watcher.value());
        tracing::debug!(expression, directive = directive.as_str(), "binding created");

        bindings.watchers.push(watcher);
        Ok(())
    }
}
